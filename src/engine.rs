//! RSVP playback engine.
//!
//! A single-threaded, deadline-driven state machine. The engine never owns a
//! timer: every operation takes the host's current clock in milliseconds,
//! and [`PlaybackEngine::next_deadline`] tells the host when to call
//! [`PlaybackEngine::tick`] next. Pausing clears the deadline outright, so a
//! stale host timer firing after a pause is a no-op rather than a stray
//! advancement.
//!
//! State machine: `Idle -> Playing <-> Paused -> Completed`, with
//! `Completed` re-entering `Playing` on replay. Word advancement is strictly
//! sequential; paragraph markers are skipped through (contributing a pause
//! and a fade, never a frame), and rate changes only ever affect the next
//! scheduled delay.

use serde::{Deserialize, Serialize};

use crate::document::{Chapter, Document};
use crate::error::EngineError;
use crate::sequence::{real_word_count, split_at_orp, tokenize, Token};

/// Timing and limit configuration for the playback engine.
///
/// Every scheduling constant is named here so the timing algorithm can be
/// tested independently of the host's rendering.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lower bound for the playback rate.
    pub min_wpm: u32,
    /// Upper bound for the playback rate.
    pub max_wpm: u32,
    /// Rate the automatic ramp starts from; also the initial rate.
    pub ramp_start_wpm: u32,
    /// Rate the automatic ramp eases toward.
    pub ramp_end_wpm: u32,
    /// Total ramp duration.
    pub ramp_duration_ms: u64,
    /// Cadence of ramp rate updates.
    pub ramp_tick_ms: u64,
    /// Extra dwell after sentence-ending punctuation (`.` `!` `?`).
    pub sentence_pause_ms: u64,
    /// Extra dwell after clause punctuation (`,` `;` `:`).
    pub clause_pause_ms: u64,
    /// Extra dwell contributed by a paragraph boundary.
    pub paragraph_pause_ms: u64,
    /// Length of the fade transition at paragraph cuts and sentence ends.
    pub fade_ms: u64,
    /// Pause before auto-advancing into the next chapter.
    pub chapter_advance_delay_ms: u64,
    /// Minimum real words a sequence needs before a session may start.
    pub min_sequence_words: usize,
    /// Sessions with fewer real words read report an average of zero.
    pub min_counted_words: usize,
    /// Reported average WPM is clamped to this bound.
    pub max_reported_wpm: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_wpm: 50,
            max_wpm: 1200,
            ramp_start_wpm: 200,
            ramp_end_wpm: 700,
            ramp_duration_ms: 30_000,
            ramp_tick_ms: 500,
            sentence_pause_ms: 50,
            clause_pause_ms: 25,
            paragraph_pause_ms: 100,
            fade_ms: 60,
            chapter_advance_delay_ms: 500,
            min_sequence_words: 5,
            min_counted_words: 3,
            max_reported_wpm: 2000,
        }
    }
}

/// Focal highlight theme carried in the playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FocalTheme {
    /// Red highlight.
    #[default]
    Focus,
    /// Cyan highlight.
    Calm,
    /// Green highlight.
    Energy,
    /// Yellow highlight.
    Sunset,
}

impl FocalTheme {
    /// Highlight color as a hex string.
    #[must_use]
    pub fn highlight_color(self) -> &'static str {
        match self {
            FocalTheme::Focus => "#FF4444",
            FocalTheme::Calm => "#22D3EE",
            FocalTheme::Energy => "#39FF14",
            FocalTheme::Sunset => "#FBBF24",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FocalTheme::Focus => "Focus",
            FocalTheme::Calm => "Calm",
            FocalTheme::Energy => "Energy",
            FocalTheme::Sunset => "Sunset",
        }
    }
}

/// Read-only snapshot of session statistics. Recomputed fresh on each
/// request, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Real (non-marker) words displayed.
    pub words_read: usize,
    /// Accumulated play time, excluding paused time, in whole seconds.
    pub elapsed_seconds: u64,
    /// `round(words_read / elapsed * 60)`, zeroed for trivially short
    /// sessions and clamped to the configured bound.
    pub avg_wpm: u32,
}

/// What the host should draw for the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordDisplay {
    /// A real word split around its optical recognition point.
    Word {
        /// Characters before the focal character.
        before: String,
        /// The focal character.
        focus: String,
        /// Characters after the focal character.
        after: String,
    },
    /// A paragraph boundary; rendered as a rest, not a word.
    Pause,
}

/// Per-tick render snapshot emitted to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    /// Current index into the word sequence.
    pub index: usize,
    /// Sequence length.
    pub total: usize,
    /// Current playback rate.
    pub wpm: u32,
    /// Active chapter index.
    pub chapter: usize,
    /// Current word, pre-split for focal rendering.
    pub display: WordDisplay,
    /// Whether the display is mid fade-out.
    pub fading: bool,
    /// Words left after the current one.
    pub words_remaining: usize,
}

impl RenderState {
    /// Estimated minutes left at the current rate.
    #[must_use]
    pub fn minutes_left(&self) -> f64 {
        if self.wpm == 0 {
            0.0
        } else {
            self.words_remaining as f64 / f64::from(self.wpm)
        }
    }
}

/// Playback lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Session created, never played.
    Idle,
    /// Advancing through the sequence.
    Playing,
    /// Frozen mid-sequence.
    Paused,
    /// Sequence exhausted, stats finalized.
    Completed,
}

/// The engine's sole output surface.
///
/// All methods default to no-ops so hosts and tests implement only what
/// they observe.
pub trait EngineSink {
    /// A different chapter became active.
    fn chapter_changed(&mut self, _index: usize) {}
    /// True end of document: the session finished and stats are final.
    fn session_done(&mut self, _stats: SessionStats) {}
    /// The display changed (word advance, fade frame, chapter swap).
    fn render(&mut self, _state: &RenderState) {}
}

/// The single scheduled operation. At most one exists at a time; it is
/// replaced or cleared, never overlapped.
#[derive(Debug, Clone, Copy)]
enum Pending {
    /// Dwell on the current word until `at`, then advance.
    Advance { at: u64 },
    /// Mid-fade: swap to `to_index` at `at`.
    FadeSwap { at: u64, to_index: usize },
    /// Between chapters: load the next chapter at `at`.
    ChapterStart { at: u64 },
}

impl Pending {
    fn due_at(self) -> u64 {
        match self {
            Pending::Advance { at } | Pending::FadeSwap { at, .. } | Pending::ChapterStart { at } => {
                at
            }
        }
    }
}

/// Deadline-driven RSVP playback over a word sequence.
///
/// The engine exclusively owns its playback state for the duration of one
/// reading session; the word sequence is immutable input, replaced wholesale
/// on chapter switches after the in-flight deadline is canceled.
#[derive(Debug)]
pub struct PlaybackEngine {
    config: EngineConfig,
    chapters: Vec<Chapter>,
    tokens: Vec<Token>,
    phase: Phase,
    index: usize,
    wpm: u32,
    auto_ramp: bool,
    ramp_elapsed_ms: u64,
    ramp_due: Option<u64>,
    chapter_index: usize,
    theme: FocalTheme,
    pending: Option<Pending>,
    fading: bool,
    play_started_at: Option<u64>,
    accumulated_play_ms: u64,
    words_read: usize,
}

impl PlaybackEngine {
    /// Builds an engine over a pre-tokenized sequence (no chapters).
    ///
    /// Refuses sequences with fewer than the configured minimum of real
    /// words; the caller should surface the error instead of starting a
    /// session.
    pub fn new(tokens: Vec<Token>, config: EngineConfig) -> Result<Self, EngineError> {
        let real = real_word_count(&tokens);
        if real < config.min_sequence_words {
            return Err(EngineError::SequenceTooShort {
                got: real,
                min: config.min_sequence_words,
            });
        }
        let wpm = config.ramp_start_wpm;
        Ok(Self {
            config,
            chapters: Vec::new(),
            tokens,
            phase: Phase::Idle,
            index: 0,
            wpm,
            auto_ramp: true,
            ramp_elapsed_ms: 0,
            ramp_due: None,
            chapter_index: 0,
            theme: FocalTheme::default(),
            pending: None,
            fading: false,
            play_started_at: None,
            accumulated_play_ms: 0,
            words_read: 0,
        })
    }

    /// Builds an engine over an extracted document, using its chapters for
    /// navigation and auto-advance when present.
    pub fn from_document(doc: &Document, config: EngineConfig) -> Result<Self, EngineError> {
        let chapters = doc.chapters.clone().unwrap_or_default();
        let first_text = chapters.first().map_or(doc.text.as_str(), |c| c.text.as_str());
        let mut engine = Self::new(tokenize(first_text), config)?;
        engine.chapters = chapters;
        Ok(engine)
    }

    // === State accessors ===

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current playback rate.
    #[must_use]
    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    /// Current index into the active word sequence.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Active chapter index.
    #[must_use]
    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    /// Number of chapters available for navigation.
    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Whether the automatic speed ramp is still active.
    #[must_use]
    pub fn auto_ramp(&self) -> bool {
        self.auto_ramp
    }

    /// Selected focal theme.
    #[must_use]
    pub fn theme(&self) -> FocalTheme {
        self.theme
    }

    /// Selects the focal theme.
    pub fn set_theme(&mut self, theme: FocalTheme) {
        self.theme = theme;
    }

    /// Enables or disables the automatic speed ramp.
    pub fn set_auto_ramp(&mut self, enabled: bool) {
        self.auto_ramp = enabled;
        if !enabled {
            self.ramp_due = None;
        }
    }

    /// When the host should next call [`Self::tick`], if anything is
    /// scheduled.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        let pending = self.pending.map(Pending::due_at);
        match (pending, self.ramp_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Snapshot of what the host should draw right now.
    #[must_use]
    pub fn render_state(&self) -> RenderState {
        let display = match self.tokens.get(self.index) {
            Some(Token::Word(word)) => {
                let (before, focus, after) = split_at_orp(word);
                WordDisplay::Word {
                    before: before.to_string(),
                    focus: focus.to_string(),
                    after: after.to_string(),
                }
            }
            _ => WordDisplay::Pause,
        };
        RenderState {
            index: self.index,
            total: self.tokens.len(),
            wpm: self.wpm,
            chapter: self.chapter_index,
            display,
            fading: self.fading,
            words_remaining: self.tokens.len().saturating_sub(self.index + 1),
        }
    }

    /// Fresh statistics snapshot for the given clock.
    #[must_use]
    pub fn stats(&self, now_ms: u64) -> SessionStats {
        let mut total_ms = self.accumulated_play_ms;
        if let Some(start) = self.play_started_at {
            total_ms += now_ms.saturating_sub(start);
        }
        let seconds = (total_ms as f64 / 1000.0).max(1.0);

        let avg_wpm = if self.words_read < self.config.min_counted_words {
            0
        } else {
            let raw = ((self.words_read as f64 / seconds) * 60.0).round() as u32;
            raw.min(self.config.max_reported_wpm)
        };

        SessionStats {
            words_read: self.words_read,
            elapsed_seconds: seconds.round() as u64,
            avg_wpm,
        }
    }

    // === Operations ===

    /// Starts or resumes playback.
    ///
    /// From `Completed`, restarts the session from the top: index zero, rate
    /// back at the ramp start, ramp re-enabled.
    pub fn play(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        match self.phase {
            Phase::Playing => {}
            Phase::Completed => {
                self.index = 0;
                self.wpm = self.config.ramp_start_wpm;
                self.ramp_elapsed_ms = 0;
                self.auto_ramp = true;
                self.begin_playing(now_ms, sink);
            }
            Phase::Idle | Phase::Paused => self.begin_playing(now_ms, sink),
        }
    }

    /// Freezes playback. Any scheduled advancement is canceled immediately;
    /// a host timer firing after this call finds nothing to do.
    pub fn pause(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Paused;
        self.accumulate_play_time(now_ms);
        self.pending = None;
        self.ramp_due = None;
        self.fading = false;
    }

    /// Moves the position by `delta` words, clamped to the sequence bounds.
    /// Does not change the play state; a scheduled advancement continues
    /// from the new position.
    pub fn seek(&mut self, delta: i64) {
        if self.tokens.is_empty() {
            return;
        }
        let max = (self.tokens.len() - 1) as i64;
        self.index = (self.index as i64 + delta).clamp(0, max) as usize;
    }

    /// Adjusts the rate by `delta` WPM, clamped to the configured range.
    ///
    /// Manual control always wins: the automatic ramp stops permanently.
    /// While playing, the current dwell restarts with the new rate; no
    /// leftover partial delay from the old rate survives.
    pub fn adjust_rate(&mut self, delta: i32, now_ms: u64) {
        self.auto_ramp = false;
        self.ramp_due = None;

        let next = i64::from(self.wpm) + i64::from(delta);
        self.wpm = next.clamp(i64::from(self.config.min_wpm), i64::from(self.config.max_wpm)) as u32;

        if self.phase == Phase::Playing {
            if let Some(Pending::Advance { .. }) = self.pending {
                self.pending = Some(Pending::Advance {
                    at: now_ms + self.word_delay(self.index),
                });
            }
        }
    }

    /// Jumps to a chapter: stops playback, swaps in the chapter's sequence,
    /// resets the position, and notifies the sink.
    pub fn goto_chapter(
        &mut self,
        index: usize,
        now_ms: u64,
        sink: &mut dyn EngineSink,
    ) -> Result<(), EngineError> {
        if index >= self.chapters.len() {
            return Err(EngineError::ChapterOutOfRange {
                index,
                count: self.chapters.len(),
            });
        }

        if self.phase == Phase::Playing {
            self.accumulate_play_time(now_ms);
        }
        if self.phase != Phase::Idle {
            self.phase = Phase::Paused;
        }
        self.ramp_due = None;
        self.load_chapter(index);
        sink.chapter_changed(index);
        Ok(())
    }

    /// Drives all scheduled work that is due at `now_ms`. Safe to call at
    /// any time; does nothing unless playing and something is due.
    pub fn tick(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        if self.phase != Phase::Playing {
            return;
        }

        // The ramp runs on its own cadence, catching up if the host tick is
        // late. Ramp-driven rate changes never restart the in-flight dwell;
        // they only affect the next scheduled delay.
        while let Some(due) = self.ramp_due {
            if now_ms < due {
                break;
            }
            self.ramp_step();
            if self.auto_ramp && self.ramp_elapsed_ms < self.config.ramp_duration_ms {
                self.ramp_due = Some(due + self.config.ramp_tick_ms);
            } else {
                self.ramp_due = None;
            }
        }

        match self.pending {
            Some(Pending::Advance { at }) if now_ms >= at => self.fire_advance(now_ms, sink),
            Some(Pending::FadeSwap { at, to_index }) if now_ms >= at => {
                self.index = to_index;
                self.fading = false;
                sink.render(&self.render_state());
                self.schedule_advance(now_ms, sink);
            }
            Some(Pending::ChapterStart { at }) if now_ms >= at => {
                let next = self.chapter_index + 1;
                self.load_chapter(next);
                if self.tokens.first().is_some_and(Token::is_word) {
                    self.words_read += 1;
                }
                sink.chapter_changed(next);
                sink.render(&self.render_state());
                self.schedule_advance(now_ms, sink);
            }
            _ => {}
        }
    }

    // === Internals ===

    fn begin_playing(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        self.phase = Phase::Playing;
        self.play_started_at = Some(now_ms);
        self.fading = false;

        // The word on screen at session start counts as read.
        if self.words_read == 0 && self.tokens.get(self.index).is_some_and(Token::is_word) {
            self.words_read = 1;
        }

        self.schedule_advance(now_ms, sink);
        if self.auto_ramp && self.ramp_elapsed_ms < self.config.ramp_duration_ms {
            self.ramp_due = Some(now_ms + self.config.ramp_tick_ms);
        }
    }

    fn accumulate_play_time(&mut self, now_ms: u64) {
        if let Some(start) = self.play_started_at.take() {
            self.accumulated_play_ms += now_ms.saturating_sub(start);
        }
    }

    /// Schedules the dwell on the current word, or handles end-of-sequence:
    /// auto-advance into the next chapter, or completion at true
    /// end-of-document.
    fn schedule_advance(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        if self.index + 1 >= self.tokens.len() {
            self.end_of_sequence(now_ms, sink);
            return;
        }
        self.pending = Some(Pending::Advance {
            at: now_ms + self.word_delay(self.index),
        });
    }

    fn end_of_sequence(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        if self.chapter_index + 1 < self.chapters.len() {
            // More chapters remain: the session keeps playing after a short
            // breather, and stats are not finalized.
            self.pending = Some(Pending::ChapterStart {
                at: now_ms + self.config.chapter_advance_delay_ms,
            });
        } else {
            self.complete(now_ms, sink);
        }
    }

    fn complete(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        self.phase = Phase::Completed;
        self.accumulate_play_time(now_ms);
        self.pending = None;
        self.ramp_due = None;
        self.fading = false;
        sink.session_done(self.stats(now_ms));
    }

    /// The advancement timer fired: move past any paragraph marker to the
    /// next word, fading across paragraph cuts and sentence ends.
    fn fire_advance(&mut self, now_ms: u64, sink: &mut dyn EngineSink) {
        let next = self.index + 1;
        let crossed_paragraph = matches!(self.tokens.get(next), Some(Token::ParagraphBreak));
        let target = if crossed_paragraph { next + 1 } else { next };

        if target >= self.tokens.len() {
            self.index = self.tokens.len() - 1;
            self.end_of_sequence(now_ms, sink);
            return;
        }

        let after_sentence = match &self.tokens[self.index] {
            Token::Word(word) => ends_sentence(word),
            Token::ParagraphBreak => false,
        };

        if self.tokens[target].is_word() {
            self.words_read += 1;
        }

        if crossed_paragraph || after_sentence {
            self.fading = true;
            sink.render(&self.render_state());
            self.pending = Some(Pending::FadeSwap {
                at: now_ms + self.config.fade_ms,
                to_index: target,
            });
        } else {
            self.index = target;
            sink.render(&self.render_state());
            self.schedule_advance(now_ms, sink);
        }
    }

    /// Dwell time for the token at `index`: base rate plus punctuation
    /// extras, plus the paragraph pause when the next token is a marker.
    fn word_delay(&self, index: usize) -> u64 {
        let base = 60_000 / u64::from(self.wpm.max(1));
        let mut delay = base;
        match &self.tokens[index] {
            Token::ParagraphBreak => delay += self.config.paragraph_pause_ms,
            Token::Word(word) => delay += self.punctuation_pause(word),
        }
        if matches!(self.tokens.get(index + 1), Some(Token::ParagraphBreak)) {
            delay += self.config.paragraph_pause_ms;
        }
        delay
    }

    fn punctuation_pause(&self, word: &str) -> u64 {
        match word.chars().last() {
            Some('.' | '!' | '?') => self.config.sentence_pause_ms,
            Some(',' | ';' | ':') => self.config.clause_pause_ms,
            _ => 0,
        }
    }

    /// One ramp tick: ease the rate out toward the target. The curve is
    /// monotonically non-decreasing and lands exactly on the end rate when
    /// the elapsed time reaches the duration.
    fn ramp_step(&mut self) {
        self.ramp_elapsed_ms += self.config.ramp_tick_ms;
        let t = (self.ramp_elapsed_ms as f64 / self.config.ramp_duration_ms as f64).min(1.0);
        let eased = 1.0 - (1.0 - t).powi(2);
        let start = f64::from(self.config.ramp_start_wpm);
        let end = f64::from(self.config.ramp_end_wpm);
        self.wpm = (start + (end - start) * eased).round() as u32;
        if t >= 1.0 {
            self.auto_ramp = false;
        }
    }

    /// Swaps in a chapter's word sequence. The in-flight deadline is always
    /// canceled before the swap, so a mid-tick switch can never observe a
    /// half-replaced sequence.
    fn load_chapter(&mut self, index: usize) {
        self.pending = None;
        self.tokens = tokenize(&self.chapters[index].text);
        self.chapter_index = index;
        self.index = 0;
        self.fading = false;
    }
}

/// Whether a word ends with sentence-terminal punctuation.
fn ends_sentence(word: &str) -> bool {
    matches!(word.chars().last(), Some('.' | '!' | '?'))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every event the engine emits.
    #[derive(Default)]
    struct Recorder {
        chapter_changes: Vec<usize>,
        done: Vec<SessionStats>,
        renders: Vec<RenderState>,
    }

    impl EngineSink for Recorder {
        fn chapter_changed(&mut self, index: usize) {
            self.chapter_changes.push(index);
        }
        fn session_done(&mut self, stats: SessionStats) {
            self.done.push(stats);
        }
        fn render(&mut self, state: &RenderState) {
            self.renders.push(state.clone());
        }
    }

    fn word_tokens(count: usize) -> Vec<Token> {
        (0..count).map(|i| Token::Word(format!("word{i}"))).collect()
    }

    fn engine_with(tokens: Vec<Token>) -> PlaybackEngine {
        PlaybackEngine::new(tokens, EngineConfig::default()).unwrap()
    }

    /// Ticks the engine at each deadline until it completes or `limit`
    /// ticks pass. Returns the clock of the final tick.
    fn run_to_completion(engine: &mut PlaybackEngine, sink: &mut Recorder, limit: usize) -> u64 {
        let mut now = 0;
        for _ in 0..limit {
            match engine.next_deadline() {
                Some(deadline) => {
                    now = deadline;
                    engine.tick(now, sink);
                }
                None => break,
            }
        }
        now
    }

    #[test]
    fn refuses_sequences_below_minimum() {
        let err = PlaybackEngine::new(word_tokens(4), EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::SequenceTooShort { got: 4, min: 5 }));
        assert!(PlaybackEngine::new(word_tokens(5), EngineConfig::default()).is_ok());
    }

    #[test]
    fn markers_do_not_count_toward_minimum() {
        let mut tokens = word_tokens(4);
        tokens.insert(2, Token::ParagraphBreak);
        assert!(PlaybackEngine::new(tokens, EngineConfig::default()).is_err());
    }

    #[test]
    fn twenty_word_sequence_completes_with_twenty_words_read() {
        let mut engine = engine_with(word_tokens(20));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        run_to_completion(&mut engine, &mut sink, 100);

        assert_eq!(engine.phase(), Phase::Completed);
        assert_eq!(sink.done.len(), 1);
        assert_eq!(sink.done[0].words_read, 20);
        // 19 advances: one render per word after the first
        assert_eq!(sink.renders.len(), 19);
    }

    #[test]
    fn rate_clamps_to_configured_bounds() {
        let mut engine = engine_with(word_tokens(10));
        for _ in 0..100 {
            engine.adjust_rate(50, 0);
        }
        assert_eq!(engine.wpm(), 1200);
        for _ in 0..100 {
            engine.adjust_rate(-50, 0);
        }
        assert_eq!(engine.wpm(), 50);
    }

    #[test]
    fn manual_rate_change_disables_ramp_permanently() {
        let mut engine = engine_with(word_tokens(10));
        let mut sink = Recorder::default();
        engine.play(0, &mut sink);
        assert!(engine.auto_ramp());

        engine.adjust_rate(50, 10);
        assert!(!engine.auto_ramp());
        assert_eq!(engine.wpm(), 250);

        // Ticking past old ramp deadlines must not resume the ramp.
        engine.tick(5_000, &mut sink);
        assert_eq!(engine.wpm(), 250);
    }

    #[test]
    fn ramp_is_monotonic_and_reaches_end_rate() {
        // A long sequence so playback outlasts the ramp.
        let mut engine = engine_with(word_tokens(1000));
        let mut sink = Recorder::default();
        engine.play(0, &mut sink);

        let config = EngineConfig::default();
        let mut last_wpm = engine.wpm();
        assert_eq!(last_wpm, config.ramp_start_wpm);

        let mut now = 0;
        while now < config.ramp_duration_ms + 2_000 {
            now += config.ramp_tick_ms;
            engine.tick(now, &mut sink);
            assert!(engine.wpm() >= last_wpm, "ramp went backwards at {now}");
            last_wpm = engine.wpm();
        }
        assert_eq!(engine.wpm(), config.ramp_end_wpm);
    }

    #[test]
    fn pause_cancels_scheduled_advancement() {
        let mut engine = engine_with(word_tokens(20));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        assert!(engine.next_deadline().is_some());

        engine.pause(100);
        assert_eq!(engine.phase(), Phase::Paused);
        assert!(engine.next_deadline().is_none());

        // A stale host timer firing long after the pause is a no-op.
        let renders_before = sink.renders.len();
        engine.tick(1_000_000, &mut sink);
        assert_eq!(sink.renders.len(), renders_before);
        assert_eq!(engine.index(), 0);
    }

    #[test]
    fn paused_time_is_excluded_from_stats() {
        let mut engine = engine_with(word_tokens(10));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        engine.pause(2_000);
        // Ten minutes pass while paused.
        engine.play(602_000, &mut sink);
        let stats = engine.stats(604_000);
        assert_eq!(stats.elapsed_seconds, 4);
    }

    #[test]
    fn trivially_short_sessions_report_zero_average() {
        let mut engine = engine_with(word_tokens(10));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        // Only the first word has been displayed.
        let stats = engine.stats(10_000);
        assert_eq!(stats.words_read, 1);
        assert_eq!(stats.avg_wpm, 0);
    }

    #[test]
    fn hundred_words_in_a_minute_reports_hundred_wpm() {
        let mut engine = engine_with(word_tokens(100));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        // 98 advances at a leisurely cadence, then the final advance lands
        // exactly at the minute mark.
        for step in 1..=98u64 {
            engine.tick(step * 500, &mut sink);
        }
        engine.tick(60_000, &mut sink);

        assert_eq!(engine.phase(), Phase::Completed);
        let stats = &sink.done[0];
        assert_eq!(stats.words_read, 100);
        assert_eq!(stats.elapsed_seconds, 60);
        assert_eq!(stats.avg_wpm, 100);
    }

    #[test]
    fn absurd_rates_are_clamped_in_reports() {
        let config = EngineConfig {
            max_wpm: 1_000_000,
            ..EngineConfig::default()
        };
        let mut engine = PlaybackEngine::new(word_tokens(200), config).unwrap();
        engine.set_auto_ramp(false);
        engine.adjust_rate(999_800, 0);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        // At this rate the dwell rounds to zero: everything fires at once.
        for _ in 0..300 {
            engine.tick(1, &mut sink);
            if engine.phase() == Phase::Completed {
                break;
            }
        }
        assert_eq!(engine.phase(), Phase::Completed);
        assert_eq!(sink.done[0].avg_wpm, 2000);
    }

    #[test]
    fn seek_clamps_to_sequence_bounds() {
        let mut engine = engine_with(word_tokens(10));
        engine.seek(-100);
        assert_eq!(engine.index(), 0);
        engine.seek(100_000);
        assert_eq!(engine.index(), 9);
        engine.seek(-3);
        assert_eq!(engine.index(), 6);
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn paragraph_markers_are_skipped_with_a_fade() {
        let tokens = vec![
            Token::Word("one".to_string()),
            Token::Word("two".to_string()),
            Token::ParagraphBreak,
            Token::Word("three".to_string()),
            Token::Word("four".to_string()),
            Token::Word("five".to_string()),
        ];
        let mut engine = engine_with(tokens);
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        // Advance onto "two".
        let deadline = engine.next_deadline().unwrap();
        engine.tick(deadline, &mut sink);
        assert_eq!(engine.index(), 1);

        // The next advance crosses the marker: first a fade-out frame...
        let deadline = engine.next_deadline().unwrap();
        engine.tick(deadline, &mut sink);
        assert!(sink.renders.last().unwrap().fading);
        assert_eq!(engine.index(), 1);

        // ...then the swap lands directly on "three".
        let deadline = engine.next_deadline().unwrap();
        engine.tick(deadline, &mut sink);
        assert_eq!(engine.index(), 3);
        assert!(!sink.renders.last().unwrap().fading);

        // The marker itself was never displayed but was counted as read.
        assert_eq!(engine.stats(deadline).words_read, 3);
    }

    #[test]
    fn sentence_end_triggers_a_fade() {
        let tokens = vec![
            Token::Word("End.".to_string()),
            Token::Word("next".to_string()),
            Token::Word("a".to_string()),
            Token::Word("b".to_string()),
            Token::Word("c".to_string()),
        ];
        let mut engine = engine_with(tokens);
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        let deadline = engine.next_deadline().unwrap();
        engine.tick(deadline, &mut sink);
        assert!(sink.renders.last().unwrap().fading);
    }

    #[test]
    fn sentence_punctuation_extends_the_dwell() {
        let tokens = vec![
            Token::Word("End.".to_string()),
            Token::Word("mid,".to_string()),
            Token::Word("plain".to_string()),
            Token::Word("x".to_string()),
            Token::Word("y".to_string()),
        ];
        let mut engine = engine_with(tokens);
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();
        let config = EngineConfig::default();
        let base = 60_000 / u64::from(engine.wpm());

        engine.play(0, &mut sink);
        assert_eq!(
            engine.next_deadline().unwrap(),
            base + config.sentence_pause_ms
        );
    }

    #[test]
    fn rate_change_restarts_the_current_dwell() {
        let mut engine = engine_with(word_tokens(10));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        let before = engine.next_deadline().unwrap();

        engine.adjust_rate(50, 100);
        let after = engine.next_deadline().unwrap();
        assert_eq!(after, 100 + 60_000 / u64::from(engine.wpm()));
        assert_ne!(before, after);
    }

    fn two_chapter_engine() -> PlaybackEngine {
        let doc = Document {
            text: String::new(),
            page_count: None,
            chapters: Some(vec![
                Chapter::new("Chapter 1", "alpha beta gamma delta epsilon".to_string()),
                Chapter::new("Chapter 2", "one two three four five six".to_string()),
            ]),
        };
        PlaybackEngine::from_document(&doc, EngineConfig::default()).unwrap()
    }

    #[test]
    fn chapters_auto_advance_before_stats_finalize() {
        let mut engine = two_chapter_engine();
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        run_to_completion(&mut engine, &mut sink, 100);

        assert_eq!(engine.phase(), Phase::Completed);
        assert_eq!(sink.chapter_changes, vec![1]);
        // Stats finalized exactly once, at true end-of-document.
        assert_eq!(sink.done.len(), 1);
        assert_eq!(sink.done[0].words_read, 11);
    }

    #[test]
    fn chapter_auto_advance_waits_the_configured_delay() {
        let mut engine = two_chapter_engine();
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        // Run chapter 1 to its last word.
        let mut now = 0;
        while engine.chapter_index() == 0 && engine.phase() == Phase::Playing {
            let Some(deadline) = engine.next_deadline() else {
                break;
            };
            // Phase stays Playing across the chapter boundary.
            assert_eq!(engine.phase(), Phase::Playing);
            now = deadline;
            engine.tick(now, &mut sink);
        }
        assert_eq!(engine.chapter_index(), 1);
        assert_eq!(engine.phase(), Phase::Playing);
        assert!(sink.done.is_empty());
        assert_eq!(engine.index(), 0);
    }

    #[test]
    fn goto_chapter_stops_playback_and_notifies() {
        let mut engine = two_chapter_engine();
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        engine.goto_chapter(1, 500, &mut sink).unwrap();

        assert_eq!(engine.phase(), Phase::Paused);
        assert_eq!(engine.chapter_index(), 1);
        assert_eq!(engine.index(), 0);
        assert_eq!(sink.chapter_changes, vec![1]);
        assert!(engine.next_deadline().is_none());
    }

    #[test]
    fn goto_chapter_out_of_range_is_rejected_without_state_change() {
        let mut engine = two_chapter_engine();
        let mut sink = Recorder::default();

        let err = engine.goto_chapter(5, 0, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ChapterOutOfRange { index: 5, count: 2 }
        ));
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.chapter_index(), 0);
    }

    #[test]
    fn replay_from_completed_resets_position_and_ramp() {
        let mut engine = engine_with(word_tokens(6));
        engine.set_auto_ramp(false);
        let mut sink = Recorder::default();

        engine.play(0, &mut sink);
        engine.adjust_rate(400, 0);
        run_to_completion(&mut engine, &mut sink, 50);
        assert_eq!(engine.phase(), Phase::Completed);

        engine.play(10_000, &mut sink);
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(engine.index(), 0);
        assert_eq!(engine.wpm(), EngineConfig::default().ramp_start_wpm);
        assert!(engine.auto_ramp());
    }

    #[test]
    fn render_state_splits_word_at_orp() {
        let engine = engine_with(vec![
            Token::Word("reading".to_string()),
            Token::Word("a".to_string()),
            Token::Word("b".to_string()),
            Token::Word("c".to_string()),
            Token::Word("d".to_string()),
        ]);
        let state = engine.render_state();
        match state.display {
            WordDisplay::Word { before, focus, after } => {
                assert_eq!(before, "r");
                assert_eq!(focus, "e");
                assert_eq!(after, "ading");
            }
            WordDisplay::Pause => panic!("expected a word display"),
        }
        assert_eq!(state.words_remaining, 4);
    }

    #[test]
    fn render_state_shows_pause_on_markers() {
        let mut engine = engine_with(vec![
            Token::Word("a".to_string()),
            Token::Word("b".to_string()),
            Token::ParagraphBreak,
            Token::Word("c".to_string()),
            Token::Word("d".to_string()),
            Token::Word("e".to_string()),
        ]);
        engine.seek(2);
        assert_eq!(engine.render_state().display, WordDisplay::Pause);
    }

    #[test]
    fn theme_selection_is_tracked() {
        let mut engine = engine_with(word_tokens(5));
        assert_eq!(engine.theme(), FocalTheme::Focus);
        engine.set_theme(FocalTheme::Calm);
        assert_eq!(engine.theme(), FocalTheme::Calm);
        assert_eq!(engine.theme().highlight_color(), "#22D3EE");
    }
}
