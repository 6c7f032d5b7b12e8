use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpeechSpeed {
    Slow,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpeechLine {
    pub(crate) text: &'static str,
    pub(crate) speed: SpeechSpeed,
}

impl SpeechLine {
    pub(crate) const fn normal(text: &'static str) -> Self {
        Self {
            text,
            speed: SpeechSpeed::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ending {
    Win,
    Lose,
}

/// One-way notifications from the simulation to whatever draws the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GameEvent {
    ScoreAdded { amount: u32, total: u32 },
    WaveLabel(u32),
    WaveCleared(u32),
    Speech(SpeechLine),
    PowerActivated,
    Ending(Ending),
}

/// Fire-and-forget HUD surface.
pub(crate) trait UiSink {
    fn add_score(&mut self, amount: u32, total: u32);
    fn set_wave_label(&mut self, wave: u32);
    fn say(&mut self, line: SpeechLine);
    fn show_ending(&mut self, ending: Ending);
    fn note(&mut self, event: GameEvent);
}

pub(crate) fn dispatch(events: impl IntoIterator<Item = GameEvent>, sink: &mut dyn UiSink) {
    for event in events {
        match event {
            GameEvent::ScoreAdded { amount, total } => sink.add_score(amount, total),
            GameEvent::WaveLabel(wave) => sink.set_wave_label(wave),
            GameEvent::Speech(line) => sink.say(line),
            GameEvent::Ending(ending) => sink.show_ending(ending),
            GameEvent::WaveCleared(_) | GameEvent::PowerActivated => sink.note(event),
        }
    }
}

/// HUD stand-in for headless runs: every notification becomes a log line.
#[derive(Debug, Default)]
pub(crate) struct TracingUiSink;

impl UiSink for TracingUiSink {
    fn add_score(&mut self, amount: u32, total: u32) {
        info!(amount, total, "score_added");
    }

    fn set_wave_label(&mut self, wave: u32) {
        info!(wave, "wave_started");
    }

    fn say(&mut self, line: SpeechLine) {
        info!(text = line.text, speed = ?line.speed, "chungus_says");
    }

    fn show_ending(&mut self, ending: Ending) {
        info!(ending = ?ending, "game_ended");
    }

    fn note(&mut self, event: GameEvent) {
        match event {
            GameEvent::WaveCleared(wave) => info!(wave, "wave_cleared"),
            GameEvent::PowerActivated => info!("power_activated"),
            other => info!(event = ?other, "game_event"),
        }
    }
}
