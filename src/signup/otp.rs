use std::time::{Duration, Instant};

pub const CODE_LEN: usize = 6;
pub const OTP_VALIDITY: Duration = Duration::from_secs(3 * 60);
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(30);

pub const EXPIRED_MESSAGE: &str = "OTP has expired. Please request a new one.";

/// The six code segments. Digits only; one character per segment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    digits: [Option<char>; CODE_LEN],
}

impl CodeEntry {
    /// Stores a digit and returns the segment that should take focus next.
    /// Non-digit input is ignored.
    pub fn set_digit(&mut self, index: usize, ch: char) -> Option<usize> {
        if index >= CODE_LEN || !ch.is_ascii_digit() {
            return None;
        }
        self.digits[index] = Some(ch);
        if index + 1 < CODE_LEN {
            Some(index + 1)
        } else {
            None
        }
    }

    pub fn clear_digit(&mut self, index: usize) {
        if index < CODE_LEN {
            self.digits[index] = None;
        }
    }

    /// Backspace on an empty segment moves focus to the previous one;
    /// on a filled segment it clears in place.
    pub fn backspace(&mut self, index: usize) -> Option<usize> {
        if index >= CODE_LEN {
            return None;
        }
        if self.digits[index].is_some() {
            self.digits[index] = None;
            None
        } else if index > 0 {
            Some(index - 1)
        } else {
            None
        }
    }

    /// Fills all segments from a pasted string. Anything other than exactly
    /// six digits is ignored.
    pub fn paste(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() != CODE_LEN || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        for (slot, ch) in self.digits.iter_mut().zip(trimmed.chars()) {
            *slot = Some(ch);
        }
        true
    }

    pub fn digit(&self, index: usize) -> Option<char> {
        self.digits.get(index).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    pub fn value(&self) -> String {
        self.digits.iter().filter_map(|d| *d).collect()
    }

    pub fn clear(&mut self) {
        self.digits = [None; CODE_LEN];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPhase {
    /// Registration form visible; nothing requested yet.
    Idle,
    /// OTP request in flight; submit control disabled.
    Requesting,
    /// Code entry visible, countdown running.
    AwaitingCode,
    /// Verification in flight.
    Verifying,
    /// Countdown hit zero; verify disabled, resend still available.
    Expired,
    /// Account created; flow finished.
    Complete,
}

/// Renderer-independent signup flow state. All transitions take the caller's
/// clock so they can be driven from tests without waiting.
///
/// Every network round trip carries the generation current when it started;
/// responses from an older generation are dropped on arrival, so a stale
/// reply can never overwrite state the user has since moved past.
#[derive(Debug)]
pub struct OtpFlow {
    phase: OtpPhase,
    pub code: CodeEntry,
    expiry: Option<Instant>,
    resend_ready: Option<Instant>,
    resend_in_flight: bool,
    generation: u64,
    pub error: Option<String>,
}

impl Default for OtpFlow {
    fn default() -> Self {
        Self {
            phase: OtpPhase::Idle,
            code: CodeEntry::default(),
            expiry: None,
            resend_ready: None,
            resend_in_flight: false,
            generation: 0,
            error: None,
        }
    }
}

impl OtpFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> OtpPhase {
        self.phase
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Abandons whatever was in flight and returns to the form. The bumped
    /// generation orphans any outstanding responses.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::default();
        self.generation = generation;
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Form passed validation; an OTP request is going out.
    pub fn begin_request(&mut self) -> Option<u64> {
        if self.phase != OtpPhase::Idle {
            return None;
        }
        self.phase = OtpPhase::Requesting;
        self.error = None;
        Some(self.bump())
    }

    pub fn request_succeeded(&mut self, generation: u64, now: Instant) {
        if !self.is_current(generation) {
            return;
        }
        self.phase = OtpPhase::AwaitingCode;
        self.start_timer(now);
    }

    pub fn request_failed(&mut self, generation: u64, message: String) {
        if !self.is_current(generation) {
            return;
        }
        self.phase = OtpPhase::Idle;
        self.error = Some(message);
    }

    /// Starts (or restarts) the 3-minute validity window and the 30-second
    /// resend cooldown.
    fn start_timer(&mut self, now: Instant) {
        self.expiry = Some(now + OTP_VALIDITY);
        self.resend_ready = Some(now + RESEND_COOLDOWN);
    }

    /// Advances time-driven state; call once per frame/tick.
    pub fn tick(&mut self, now: Instant) {
        if self.phase == OtpPhase::AwaitingCode && self.remaining(now) == Duration::ZERO {
            self.phase = OtpPhase::Expired;
            self.error = Some(EXPIRED_MESSAGE.to_string());
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.expiry {
            Some(expiry) => expiry.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Countdown rendered as MM:SS.
    pub fn countdown_label(&self, now: Instant) -> String {
        let remaining = self.remaining(now).as_secs();
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }

    pub fn can_resend(&self, now: Instant) -> bool {
        if self.resend_in_flight {
            return false;
        }
        match (self.phase, self.resend_ready) {
            (OtpPhase::AwaitingCode | OtpPhase::Expired, Some(ready)) => now >= ready,
            _ => false,
        }
    }

    /// Resend clears the typed code before the new request goes out.
    pub fn begin_resend(&mut self, now: Instant) -> Option<u64> {
        if !self.can_resend(now) {
            return None;
        }
        self.resend_in_flight = true;
        self.error = None;
        self.code.clear();
        Some(self.bump())
    }

    pub fn resend_succeeded(&mut self, generation: u64, now: Instant) {
        if !self.is_current(generation) {
            return;
        }
        self.resend_in_flight = false;
        self.phase = OtpPhase::AwaitingCode;
        self.start_timer(now);
    }

    pub fn resend_failed(&mut self, generation: u64, message: String) {
        if !self.is_current(generation) {
            return;
        }
        self.resend_in_flight = false;
        self.error = Some(message);
    }

    pub fn can_verify(&self, now: Instant) -> bool {
        self.phase == OtpPhase::AwaitingCode
            && self.remaining(now) > Duration::ZERO
            && self.code.is_complete()
    }

    pub fn begin_verify(&mut self, now: Instant) -> Option<u64> {
        if !self.can_verify(now) {
            return None;
        }
        self.phase = OtpPhase::Verifying;
        self.error = None;
        Some(self.bump())
    }

    /// Verification failed: clear the segments, return focus to the first
    /// one, re-enable the verify control.
    pub fn verify_failed(&mut self, generation: u64, message: String) {
        if !self.is_current(generation) {
            return;
        }
        self.phase = OtpPhase::AwaitingCode;
        self.code.clear();
        self.error = Some(message);
    }

    /// Verification succeeded: the countdown stops and the flow is done.
    pub fn verify_succeeded(&mut self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        self.phase = OtpPhase::Complete;
        self.expiry = None;
        self.resend_ready = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow_awaiting(now: Instant) -> (OtpFlow, u64) {
        let mut flow = OtpFlow::new();
        let generation = flow.begin_request().unwrap();
        flow.request_succeeded(generation, now);
        (flow, generation)
    }

    fn fill_code(flow: &mut OtpFlow) {
        assert!(flow.code.paste("123456"));
    }

    #[test]
    fn expiry_is_three_minutes_after_request_success() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);

        assert_eq!(flow.remaining(t0), Duration::from_secs(180));

        let just_before = t0 + Duration::from_secs(179);
        fill_code(&mut flow);
        flow.tick(just_before);
        assert_eq!(flow.phase(), OtpPhase::AwaitingCode);
        assert!(flow.can_verify(just_before));

        let at_expiry = t0 + Duration::from_secs(180);
        flow.tick(at_expiry);
        assert_eq!(flow.phase(), OtpPhase::Expired);
        assert!(!flow.can_verify(at_expiry));
        assert!(flow.can_resend(at_expiry));
        assert_eq!(flow.error.as_deref(), Some(EXPIRED_MESSAGE));
    }

    #[test]
    fn resend_is_gated_for_the_first_thirty_seconds() {
        let t0 = Instant::now();
        let (flow, _) = flow_awaiting(t0);

        assert!(!flow.can_resend(t0));
        assert!(!flow.can_resend(t0 + Duration::from_secs(29)));
        assert!(flow.can_resend(t0 + Duration::from_secs(30)));
    }

    #[test]
    fn resend_restarts_countdown_and_cooldown() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);

        let t1 = t0 + Duration::from_secs(60);
        fill_code(&mut flow);
        let generation = flow.begin_resend(t1).unwrap();
        assert!(!flow.code.is_complete(), "resend clears the typed code");

        let t2 = t1 + Duration::from_secs(2);
        flow.resend_succeeded(generation, t2);
        assert_eq!(flow.remaining(t2), Duration::from_secs(180));
        assert!(!flow.can_resend(t2 + Duration::from_secs(29)));
        assert!(flow.can_resend(t2 + Duration::from_secs(30)));
    }

    #[test]
    fn resend_recovers_from_the_expired_phase() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);

        let late = t0 + Duration::from_secs(400);
        flow.tick(late);
        assert_eq!(flow.phase(), OtpPhase::Expired);

        let generation = flow.begin_resend(late).unwrap();
        flow.resend_succeeded(generation, late);
        assert_eq!(flow.phase(), OtpPhase::AwaitingCode);
        assert_eq!(flow.remaining(late), Duration::from_secs(180));
    }

    #[test]
    fn resend_failure_restores_the_control() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);

        let t1 = t0 + Duration::from_secs(31);
        let generation = flow.begin_resend(t1).unwrap();
        assert!(!flow.can_resend(t1), "disabled while in flight");

        flow.resend_failed(generation, "Failed to resend OTP. Please try again.".to_string());
        assert!(flow.can_resend(t1));
        assert!(flow.error.is_some());
    }

    #[test]
    fn countdown_label_formats_mm_ss() {
        let t0 = Instant::now();
        let (flow, _) = flow_awaiting(t0);

        assert_eq!(flow.countdown_label(t0), "03:00");
        assert_eq!(flow.countdown_label(t0 + Duration::from_secs(61)), "01:59");
        assert_eq!(flow.countdown_label(t0 + Duration::from_secs(500)), "00:00");
    }

    #[test]
    fn six_digit_paste_fills_all_segments_in_order() {
        let mut code = CodeEntry::default();
        assert!(code.paste("493021"));
        assert_eq!(code.value(), "493021");
        assert!(code.is_complete());
    }

    #[test]
    fn non_six_digit_paste_is_ignored() {
        let mut code = CodeEntry::default();
        assert!(!code.paste("1234"));
        assert!(!code.paste("1234567"));
        assert!(!code.paste("12a456"));
        assert_eq!(code.value(), "");
    }

    #[test]
    fn typing_a_digit_advances_focus() {
        let mut code = CodeEntry::default();
        assert_eq!(code.set_digit(0, '7'), Some(1));
        assert_eq!(code.set_digit(5, '9'), None, "last segment has no next");
        assert_eq!(code.set_digit(0, 'x'), None, "non-digit ignored");
        assert_eq!(code.digit(0), Some('7'));
    }

    #[test]
    fn backspace_on_empty_segment_moves_back() {
        let mut code = CodeEntry::default();
        code.set_digit(0, '1');

        // Filled segment clears in place.
        assert_eq!(code.backspace(0), None);
        assert_eq!(code.digit(0), None);

        // Empty segment steps back; first segment has nowhere to go.
        assert_eq!(code.backspace(1), Some(0));
        assert_eq!(code.backspace(0), None);
    }

    #[test]
    fn verify_requires_a_complete_code() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);

        assert!(!flow.can_verify(t0));
        flow.code.set_digit(0, '1');
        assert!(!flow.can_verify(t0));
        fill_code(&mut flow);
        assert!(flow.can_verify(t0));
    }

    #[test]
    fn verify_failure_clears_code_and_reenables() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);
        fill_code(&mut flow);

        let generation = flow.begin_verify(t0).unwrap();
        assert_eq!(flow.phase(), OtpPhase::Verifying);

        flow.verify_failed(generation, "Invalid OTP. Please try again.".to_string());
        assert_eq!(flow.phase(), OtpPhase::AwaitingCode);
        assert!(!flow.code.is_complete());
        assert_eq!(flow.error.as_deref(), Some("Invalid OTP. Please try again."));
    }

    #[test]
    fn verify_success_stops_the_countdown() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);
        fill_code(&mut flow);

        let generation = flow.begin_verify(t0).unwrap();
        flow.verify_succeeded(generation);
        assert_eq!(flow.phase(), OtpPhase::Complete);
        assert_eq!(flow.remaining(t0), Duration::ZERO);
    }

    #[test]
    fn stale_responses_are_dropped() {
        let t0 = Instant::now();
        let mut flow = OtpFlow::new();
        let stale = flow.begin_request().unwrap();

        // User bails out before the response lands.
        flow.reset();
        flow.request_succeeded(stale, t0);
        assert_eq!(flow.phase(), OtpPhase::Idle);

        // A fresh request is unaffected by the stale failure arriving late.
        let current = flow.begin_request().unwrap();
        flow.request_failed(stale, "old error".to_string());
        assert_eq!(flow.phase(), OtpPhase::Requesting);
        flow.request_succeeded(current, t0);
        assert_eq!(flow.phase(), OtpPhase::AwaitingCode);
    }

    #[test]
    fn request_only_starts_from_idle() {
        let t0 = Instant::now();
        let (mut flow, _) = flow_awaiting(t0);
        assert!(flow.begin_request().is_none());
    }
}
