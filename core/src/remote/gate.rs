/// Generation token handed out for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Tracks the newest issued request for one resource so a late response
/// from a superseded request is discarded instead of applied.
///
/// Issuing a token invalidates every outstanding one; only the result
/// carrying the newest token is admitted.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: u64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn admits(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_request_is_admitted() {
        let mut gate = RequestGate::new();
        let first = gate.issue();
        let second = gate.issue();
        assert!(!gate.admits(first));
        assert!(gate.admits(second));
    }

    #[test]
    fn stale_result_is_discarded_in_favor_of_the_replacement() {
        // A cancelled fetch followed by a fresh fetch: even if the stale
        // response arrives afterwards, only the fresh one is applied.
        let mut gate = RequestGate::new();
        let stale = gate.issue();
        let fresh = gate.issue();

        let mut applied = Vec::new();
        for (token, payload) in [(fresh, "fresh"), (stale, "stale")] {
            if gate.admits(token) {
                applied.push(payload);
            }
        }
        assert_eq!(applied, vec!["fresh"]);
    }
}
