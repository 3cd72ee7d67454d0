use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{AppConfig, ClipPaths, Variant};
use crate::dialog::{DialogService, OverlayDialog, DISCLAIMER_BODY, DISCLAIMER_TITLE};
use crate::media::{ExternalPlayer, MediaPlayer};
use crate::picker::{ClipSlot, Clock, NamePool, SystemClock};
use crate::storage::{self, FileSettingsStore, SettingsStore};
use crate::theme::Theme;

pub const RESULT_ID: &str = "random-result";
pub const VIDEO_ID: &str = "video";

/// How long a status message stays in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Widgets that can take focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pool,
    RandomButton,
    InformationButton,
}

impl Focus {
    pub fn element_id(self) -> &'static str {
        match self {
            Focus::Pool => "random-pool",
            Focus::RandomButton => "random-button",
            Focus::InformationButton => "information-button",
        }
    }

    fn next(self) -> Self {
        match self {
            Focus::Pool => Focus::RandomButton,
            Focus::RandomButton => Focus::InformationButton,
            Focus::InformationButton => Focus::Pool,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Pool => Focus::InformationButton,
            Focus::RandomButton => Focus::Pool,
            Focus::InformationButton => Focus::RandomButton,
        }
    }
}

/// Capabilities the page talks to
pub struct Services {
    pub clock: Box<dyn Clock>,
    pub settings: Box<dyn SettingsStore>,
    pub player: Box<dyn MediaPlayer>,
}

impl Services {
    pub fn system(config: &AppConfig) -> Result<Self> {
        let settings = FileSettingsStore::open_default().context("Could not open settings store")?;
        tracing::debug!("Settings at {}", settings.path().display());
        Ok(Self {
            clock: Box::new(SystemClock),
            settings: Box::new(settings),
            player: Box::new(ExternalPlayer::new(config.player.clone())),
        })
    }
}

pub struct App {
    pub variant: Variant,
    pub focus: Focus,
    pub theme: Theme,

    // random-pool contents
    pub pool_input: String,
    // random-result contents
    pub result: Option<String>,

    pub dialog: OverlayDialog,

    // video element: last src, and whether it is shown
    pub video_src: Option<PathBuf>,
    pub video_visible: bool,

    // Due times of name reveals; each draw adds one, none are cancelled
    pub pending_reveals: Vec<Instant>,
    pub reveal_delay: Duration,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    clips: ClipPaths,
    clock: Box<dyn Clock>,
    settings: Box<dyn SettingsStore>,
    player: Box<dyn MediaPlayer>,
}

impl App {
    pub fn new(config: &AppConfig, pool: Option<String>, services: Services) -> Self {
        let mut app = Self {
            variant: config.variant,
            focus: Focus::Pool,
            theme: Theme::load(&config.palette),

            pool_input: pool.unwrap_or_else(|| config.default_pool.clone()),
            result: None,

            dialog: OverlayDialog::default(),

            video_src: None,
            video_visible: false,

            pending_reveals: Vec::new(),
            reveal_delay: Duration::from_millis(config.reveal_delay_ms),

            status_message: None,
            status_message_time: None,

            clips: config.clips.clone(),
            clock: services.clock,
            settings: services.settings,
            player: services.player,
        };

        tracing::info!("Starting in {:?} mode", app.variant);

        if app.variant == Variant::Enhanced && !storage::disclaimer_seen(app.settings.as_ref()) {
            tracing::info!("Disclaimer not acknowledged yet, showing it");
            app.show_disclaimer();
        }

        app
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    #[cfg(test)]
    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        self.handle_key_at(key, Instant::now())
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        // The dialog is modal: its button is the only control
        if self.dialog.is_visible() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc) {
                self.acknowledge_disclaimer()?;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            _ if self.focus == Focus::Pool => self.handle_pool_key(key, now)?,
            KeyCode::Enter | KeyCode::Char(' ') => match self.focus {
                Focus::RandomButton => self.click_random(now)?,
                Focus::InformationButton => self.show_disclaimer(),
                Focus::Pool => {}
            },
            KeyCode::Char('r') => self.click_random(now)?,
            KeyCode::Char('i') => self.show_disclaimer(),
            _ => {}
        }
        Ok(())
    }

    fn handle_pool_key(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        match key.code {
            // Shortcuts aren't text
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.pool_input.push(c)
            }
            KeyCode::Backspace => {
                self.pool_input.pop();
            }
            // Enter in the field draws, like pressing the button
            KeyCode::Enter => self.click_random(now)?,
            _ => {}
        }
        Ok(())
    }

    /// `random-button` handler
    pub fn click_random(&mut self, now: Instant) -> Result<()> {
        match self.variant {
            Variant::Classic => self.reveal_name(),
            Variant::Enhanced => self.start_clip_and_schedule(now),
        }
    }

    fn start_clip_and_schedule(&mut self, now: Instant) -> Result<()> {
        let timestamp = self.clock.current_time_ms();
        let clip = self.clips.for_slot(ClipSlot::for_timestamp(timestamp)).clone();

        self.pending_reveals.push(now + self.reveal_delay);
        self.video_src = Some(clip.clone());

        match self.player.play(&clip) {
            Ok(()) => {
                self.video_visible = true;
                Ok(())
            }
            Err(e) => {
                // The reveal still fires without the clip
                self.video_visible = false;
                tracing::warn!("Could not play {}: {:#}", clip.display(), e);
                Err(e)
            }
        }
    }

    /// Draw from the pool as it is right now and write the name into the result
    fn reveal_name(&mut self) -> Result<()> {
        let pick = NamePool::parse(&self.pool_input).pick(self.clock.as_ref())?;
        tracing::debug!(
            "Picked index {} of {} at {}",
            pick.index,
            pick.pool_size,
            pick.timestamp
        );
        self.result = Some(pick.name);
        Ok(())
    }

    /// `information-button` handler
    pub fn show_disclaimer(&mut self) {
        self.dialog.show(DISCLAIMER_TITLE, DISCLAIMER_BODY);
    }

    fn acknowledge_disclaimer(&mut self) -> Result<()> {
        if !self.dialog.acknowledge() {
            return Ok(());
        }
        if self.variant == Variant::Enhanced && !storage::disclaimer_seen(self.settings.as_ref()) {
            storage::mark_disclaimer_seen(self.settings.as_mut())
                .context("Could not remember the disclaimer")?;
            tracing::info!("Disclaimer acknowledged");
        }
        Ok(())
    }

    pub fn tick(&mut self) -> Result<()> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Result<()> {
        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if now.saturating_duration_since(time) >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        if self.player.poll_ended() {
            self.video_visible = false;
        }

        // Fire due reveals in order; a later one overwrites an earlier one
        let due = self.pending_reveals.iter().filter(|at| **at <= now).count();
        self.pending_reveals.retain(|at| *at > now);
        let mut first_error = None;
        for _ in 0..due {
            if let Err(e) = self.reveal_name() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Show an error from a handler in the info line
    pub fn report_error(&mut self, e: &anyhow::Error) {
        self.set_status(format!("Error: {}", e));
    }

    /// Time until the next reveal, for the countdown in the video pane
    pub fn next_reveal_in(&self, now: Instant) -> Option<Duration> {
        self.pending_reveals
            .iter()
            .min()
            .map(|at| at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemorySettingsStore, DISCLAIMER_SEEN_KEY};
    use std::cell::{Cell, RefCell};
    use std::path::Path;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedClock(Rc<Cell<u64>>);

    impl Clock for SharedClock {
        fn current_time_ms(&self) -> u64 {
            self.0.get()
        }
    }

    #[derive(Clone, Default)]
    struct FakePlayer {
        played: Rc<RefCell<Vec<PathBuf>>>,
        ended: Rc<Cell<bool>>,
        fail: bool,
    }

    impl MediaPlayer for FakePlayer {
        fn play(&mut self, clip: &Path) -> Result<()> {
            if self.fail {
                anyhow::bail!("no player");
            }
            self.played.borrow_mut().push(clip.to_path_buf());
            Ok(())
        }

        fn poll_ended(&mut self) -> bool {
            self.ended.replace(false)
        }

        fn stop(&mut self) {}
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn config(variant: Variant, pool: &str) -> AppConfig {
        AppConfig {
            variant,
            default_pool: pool.to_string(),
            ..Default::default()
        }
    }

    fn app_with(
        config: &AppConfig,
        clock: &SharedClock,
        player: &FakePlayer,
        settings: Box<dyn SettingsStore>,
    ) -> App {
        App::new(
            config,
            None,
            Services {
                clock: Box::new(clock.clone()),
                settings,
                player: Box::new(player.clone()),
            },
        )
    }

    fn seen_store() -> Box<dyn SettingsStore> {
        let mut store = MemorySettingsStore::default();
        store.set(DISCLAIMER_SEEN_KEY, "true").unwrap();
        Box::new(store)
    }

    #[test]
    fn test_classic_pick_is_immediate() {
        let clock = SharedClock::default();
        clock.0.set(1_700_000_000_002);
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Classic, "Alice Bob Carol"),
            &clock,
            &player,
            Box::new(MemorySettingsStore::default()),
        );

        // Classic never auto-shows the disclaimer
        assert!(!app.dialog.is_visible());

        app.click_random(Instant::now()).unwrap();
        assert_eq!(app.result.as_deref(), Some("Bob"));
        assert!(player.played.borrow().is_empty());
        assert!(!app.video_visible);
    }

    #[test]
    fn test_empty_pool_fails_and_keeps_result() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Classic, "Zed"),
            &clock,
            &player,
            Box::new(MemorySettingsStore::default()),
        );
        app.click_random(Instant::now()).unwrap();
        assert_eq!(app.result.as_deref(), Some("Zed"));

        app.pool_input.clear();
        assert!(app.click_random(Instant::now()).is_err());
        assert_eq!(app.result.as_deref(), Some("Zed"));
    }

    #[test]
    fn test_enhanced_reveal_waits_for_delay() {
        let clock = SharedClock::default();
        clock.0.set(10);
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Enhanced, "Alice Bob Carol"),
            &clock,
            &player,
            seen_store(),
        );

        let start = Instant::now();
        app.click_random(start).unwrap();
        assert!(app.video_visible);
        assert_eq!(app.result, None);

        app.tick_at(start + Duration::from_millis(999)).unwrap();
        assert_eq!(app.result, None);

        // Clock moves on before the reveal fires: 1_000_001 % 3 == 2
        clock.0.set(1_000_001);
        app.tick_at(start + Duration::from_millis(1000)).unwrap();
        assert_eq!(app.result.as_deref(), Some("Carol"));
        assert!(app.pending_reveals.is_empty());
    }

    #[test]
    fn test_clip_follows_timestamp_parity() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(&config(Variant::Enhanced, "A B"), &clock, &player, seen_store());

        clock.0.set(4);
        app.click_random(Instant::now()).unwrap();
        clock.0.set(7);
        app.click_random(Instant::now()).unwrap();

        assert_eq!(
            *player.played.borrow(),
            vec![PathBuf::from("./video/ys.mp4"), PathBuf::from("./video/sr.mp4")]
        );
        assert_eq!(app.video_src, Some(PathBuf::from("./video/sr.mp4")));
    }

    #[test]
    fn test_video_hides_when_playback_ends() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(&config(Variant::Enhanced, "A"), &clock, &player, seen_store());

        let start = Instant::now();
        app.click_random(start).unwrap();
        assert!(app.video_visible);

        player.ended.set(true);
        app.tick_at(start).unwrap();
        assert!(!app.video_visible);
        // src is kept, only hidden
        assert!(app.video_src.is_some());
    }

    #[test]
    fn test_double_click_reveals_twice() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Enhanced, "Alice Bob Carol"),
            &clock,
            &player,
            seen_store(),
        );

        let start = Instant::now();
        app.click_random(start).unwrap();
        app.click_random(start + Duration::from_millis(300)).unwrap();
        assert_eq!(app.pending_reveals.len(), 2);

        clock.0.set(0);
        app.tick_at(start + Duration::from_millis(1000)).unwrap();
        assert_eq!(app.result.as_deref(), Some("Alice"));
        assert_eq!(app.pending_reveals.len(), 1);

        clock.0.set(1);
        app.tick_at(start + Duration::from_millis(1300)).unwrap();
        assert_eq!(app.result.as_deref(), Some("Bob"));
        assert!(app.pending_reveals.is_empty());
    }

    #[test]
    fn test_failed_playback_still_reveals() {
        let clock = SharedClock::default();
        let player = FakePlayer {
            fail: true,
            ..Default::default()
        };
        let mut app = app_with(&config(Variant::Enhanced, "Solo"), &clock, &player, seen_store());

        let start = Instant::now();
        assert!(app.click_random(start).is_err());
        assert!(!app.video_visible);

        app.tick_at(start + Duration::from_secs(1)).unwrap();
        assert_eq!(app.result.as_deref(), Some("Solo"));
    }

    #[test]
    fn test_disclaimer_auto_shows_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let cfg = config(Variant::Enhanced, "A");

        let mut first = app_with(&cfg, &clock, &player, Box::new(FileSettingsStore::at(&path)));
        assert!(first.dialog.is_visible());
        first.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(!first.dialog.is_visible());
        assert!(storage::disclaimer_seen(first.settings()));

        let second = app_with(&cfg, &clock, &player, Box::new(FileSettingsStore::at(&path)));
        assert!(!second.dialog.is_visible());
    }

    #[test]
    fn test_unacknowledged_disclaimer_shows_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let cfg = config(Variant::Enhanced, "A");

        let first = app_with(&cfg, &clock, &player, Box::new(FileSettingsStore::at(&path)));
        assert!(first.dialog.is_visible());
        drop(first);

        let second = app_with(&cfg, &clock, &player, Box::new(FileSettingsStore::at(&path)));
        assert!(second.dialog.is_visible());
    }

    #[test]
    fn test_second_acknowledgement_leaves_flag() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Enhanced, "A"),
            &clock,
            &player,
            Box::new(MemorySettingsStore::default()),
        );

        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.settings().get(DISCLAIMER_SEEN_KEY).as_deref(), Some("true"));

        app.focus = Focus::InformationButton;
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(app.dialog.is_visible());
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!app.dialog.is_visible());
        assert_eq!(app.settings().get(DISCLAIMER_SEEN_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_classic_does_not_persist_flag() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Classic, "A"),
            &clock,
            &player,
            Box::new(MemorySettingsStore::default()),
        );
        app.show_disclaimer();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.settings().get(DISCLAIMER_SEEN_KEY), None);
    }

    #[test]
    fn test_dialog_blocks_page_keys() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(
            &config(Variant::Enhanced, "A"),
            &clock,
            &player,
            Box::new(MemorySettingsStore::default()),
        );
        assert!(app.dialog.is_visible());
        app.handle_key(key(KeyCode::Char('x'))).unwrap();
        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.pool_input, "A");
        assert_eq!(app.focus, Focus::Pool);
    }

    #[test]
    fn test_modified_keys_are_not_typed() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(&config(Variant::Classic, "Ann"), &clock, &player, seen_store());

        app.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)).unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT)).unwrap();
        assert_eq!(app.pool_input, "Ann");

        // Shifted letters are still text
        app.handle_key(KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(app.pool_input, "AnnB");
    }

    #[test]
    fn test_typing_and_focus() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(&config(Variant::Classic, ""), &clock, &player, seen_store());

        for c in "Ann Bo".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.pool_input, "Ann B");

        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.focus.element_id(), "random-button");
        clock.0.set(1);
        app.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.result.as_deref(), Some("B"));

        app.handle_key(key(KeyCode::BackTab)).unwrap();
        app.handle_key(key(KeyCode::BackTab)).unwrap();
        assert_eq!(app.focus, Focus::InformationButton);
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(app.dialog.is_visible());
    }

    #[test]
    fn test_status_message_clears() {
        let clock = SharedClock::default();
        let player = FakePlayer::default();
        let mut app = app_with(&config(Variant::Classic, ""), &clock, &player, seen_store());

        let err = app.click_random(Instant::now()).unwrap_err();
        app.report_error(&err);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Error: the name pool is empty")
        );

        app.tick_at(Instant::now() + Duration::from_secs(4)).unwrap();
        assert_eq!(app.status_message, None);
    }
}
