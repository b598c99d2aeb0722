//! Content-based fingerprints for evaluation requests.

use sha2::{Digest, Sha256};

use crate::request::EvalRequest;

/// Cache key of an evaluation: the source identity plus the request.
pub fn fingerprint(source_label: &str, request: &EvalRequest) -> String {
    let mut hasher = Sha256::new();

    hasher.update(source_label.as_bytes());
    hasher.update([0u8]);

    let request_json = serde_json::to_string(request).unwrap_or_default();
    hasher.update(request_json.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::TimeSelector;

    #[test]
    fn fingerprint_stability() {
        let req = EvalRequest::new("U");
        let a = fingerprint("/data/file.rst", &req);
        let b = fingerprint("/data/file.rst", &req);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_differs_for_different_inputs() {
        let req = EvalRequest::new("U");
        let mut all = req.clone();
        all.time = TimeSelector::AllSets;
        assert_ne!(fingerprint("a", &req), fingerprint("a", &all));
        assert_ne!(fingerprint("a", &req), fingerprint("b", &req));
    }
}
