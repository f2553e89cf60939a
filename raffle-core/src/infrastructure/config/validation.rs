use crate::infrastructure::config::types::AppConfig;

const MAX_RETRY_ATTEMPTS: usize = 20;

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let rpc_url = self.oracle.rpc_url.trim();
        if rpc_url.is_empty() {
            errors.push("oracle.rpc_url must not be empty".to_string());
        } else if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            errors.push(format!("oracle.rpc_url must use http or https: {}", crate::infrastructure::oracle::redact_url(rpc_url)));
        }
        if self.oracle.request_timeout_ms == 0 {
            errors.push("oracle.request_timeout_ms must be > 0".to_string());
        }
        if self.oracle.retry_attempts == 0 {
            errors.push("oracle.retry_attempts must be >= 1".to_string());
        }
        if self.oracle.retry_attempts > MAX_RETRY_ATTEMPTS {
            errors.push(format!("oracle.retry_attempts should not exceed {}", MAX_RETRY_ATTEMPTS));
        }
        if self.oracle.circuit_breaker.failure_threshold == 0 {
            errors.push("oracle.circuit_breaker.failure_threshold must be > 0".to_string());
        }

        if self.scheduler.poll_interval_secs == 0 {
            errors.push("scheduler.poll_interval_secs must be > 0".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        for raffle_id in &self.scheduler.raffle_ids {
            if !seen.insert(raffle_id) {
                errors.push(format!("scheduler.raffle_ids contains {} twice", raffle_id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
