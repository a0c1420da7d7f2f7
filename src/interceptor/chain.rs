//! Ordered, statically configured interceptor chain.

use std::sync::Arc;

use axum::response::Response;
use thiserror::Error;

use crate::error::GatewayError;
use crate::http::GatewayRequest;
use crate::interceptor::{
    Interceptor, Next, Upstream, TENANT_CONTEXT_NAME, TENANT_CONTEXT_PRIORITY, TRACE_CONTEXT_NAME,
    TRACE_CONTEXT_PRIORITY,
};

/// Built-in stages and the only priorities they may hold.
const RESERVED: [(&str, i32); 2] = [
    (TRACE_CONTEXT_NAME, TRACE_CONTEXT_PRIORITY),
    (TENANT_CONTEXT_NAME, TENANT_CONTEXT_PRIORITY),
];

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("interceptors '{first}' and '{second}' share priority {priority}")]
    DuplicatePriority {
        first: &'static str,
        second: &'static str,
        priority: i32,
    },

    #[error("interceptor '{name}' has priority {priority}, reserved for the built-in stages")]
    ReservedPriority { name: &'static str, priority: i32 },
}

/// Interceptors sorted by ascending priority, ending in an [`Upstream`].
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
    upstream: Arc<dyn Upstream>,
}

impl InterceptorChain {
    /// Build a chain. Order of `interceptors` does not matter; priority does.
    pub fn new(
        mut interceptors: Vec<Arc<dyn Interceptor>>,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, ChainError> {
        interceptors.sort_by_key(|i| i.priority());

        if let Some(pair) = interceptors
            .windows(2)
            .find(|pair| pair[0].priority() == pair[1].priority())
        {
            return Err(ChainError::DuplicatePriority {
                first: pair[0].name(),
                second: pair[1].name(),
                priority: pair[0].priority(),
            });
        }

        if let Some(interceptor) = interceptors.iter().find(|i| {
            i.priority() <= TENANT_CONTEXT_PRIORITY && !RESERVED.contains(&(i.name(), i.priority()))
        }) {
            return Err(ChainError::ReservedPriority {
                name: interceptor.name(),
                priority: interceptor.priority(),
            });
        }

        Ok(Self {
            interceptors,
            upstream,
        })
    }

    /// Run one request through every interceptor and the upstream.
    pub async fn handle(&self, request: GatewayRequest) -> Result<Response, GatewayError> {
        Next::new(&self.interceptors, self.upstream.as_ref())
            .run(request)
            .await
    }

    /// Interceptor names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::TraceContextInjector;
    use crate::observability::IdGenerator;
    use crate::test_support::{request, RecordingUpstream};
    use async_trait::async_trait;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use std::sync::Mutex;

    /// Appends its name to a shared log and stamps a header.
    struct Stage {
        name: &'static str,
        priority: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Interceptor for Stage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn intercept(
            &self,
            request: GatewayRequest,
            next: Next<'_>,
        ) -> Result<Response, GatewayError> {
            self.log.lock().unwrap().push(self.name);
            let request = request.with_header(
                axum::http::HeaderName::from_static("x-stage"),
                HeaderValue::from_static(self.name),
            );
            next.run(request).await
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Interceptor for ShortCircuit {
        fn name(&self) -> &'static str {
            "short-circuit"
        }

        fn priority(&self) -> i32 {
            0
        }

        async fn intercept(
            &self,
            _request: GatewayRequest,
            _next: Next<'_>,
        ) -> Result<Response, GatewayError> {
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }

    fn stage(
        name: &'static str,
        priority: i32,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn Interceptor> {
        Arc::new(Stage {
            name,
            priority,
            log: log.clone(),
        })
    }

    #[tokio::test]
    async fn test_runs_in_ascending_priority_once_each() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let upstream = Arc::new(RecordingUpstream::default());
        let chain = InterceptorChain::new(
            vec![stage("late", 10, &log), stage("first", -5, &log), stage("middle", 0, &log)],
            upstream.clone(),
        )
        .unwrap();

        assert_eq!(chain.names(), vec!["first", "middle", "late"]);

        let response = chain.handle(request("/orders")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["first", "middle", "late"]);

        let seen = upstream.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].headers["x-stage"], "late");
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = InterceptorChain::new(
            vec![stage("a", 1, &log), stage("b", 1, &log)],
            Arc::new(RecordingUpstream::default()),
        )
        .unwrap_err();

        assert!(matches!(err, ChainError::DuplicatePriority { priority: 1, .. }));
    }

    #[test]
    fn test_priority_ahead_of_built_ins_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trace: Arc<dyn Interceptor> =
            Arc::new(TraceContextInjector::new(false, Arc::new(IdGenerator::seeded(1))));

        for priority in [-20_000, TRACE_CONTEXT_PRIORITY - 1, TENANT_CONTEXT_PRIORITY] {
            let err = InterceptorChain::new(
                vec![trace.clone(), stage("early", priority, &log)],
                Arc::new(RecordingUpstream::default()),
            )
            .unwrap_err();

            assert!(
                matches!(
                    err,
                    ChainError::ReservedPriority { name: "early", priority: p } if p == priority
                ),
                "unexpected error for priority {priority}: {err:?}"
            );
        }
    }

    #[test]
    fn test_built_in_name_at_other_priority_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = InterceptorChain::new(
            vec![stage(TRACE_CONTEXT_NAME, -10_000, &log)],
            Arc::new(RecordingUpstream::default()),
        )
        .unwrap_err();

        assert!(matches!(err, ChainError::ReservedPriority { priority: -10_000, .. }));
    }

    #[tokio::test]
    async fn test_built_ins_run_before_first_allowed_priority() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let upstream = Arc::new(RecordingUpstream::default());
        let trace: Arc<dyn Interceptor> =
            Arc::new(TraceContextInjector::new(false, Arc::new(IdGenerator::seeded(1))));
        let chain = InterceptorChain::new(
            vec![stage("after-tenant", TENANT_CONTEXT_PRIORITY + 1, &log), trace],
            upstream.clone(),
        )
        .unwrap();

        assert_eq!(chain.names(), vec![TRACE_CONTEXT_NAME, "after-tenant"]);
        chain.handle(request("/")).await.unwrap();
        assert!(upstream.seen()[0].headers.contains_key("x-b3-traceid"));
    }

    #[tokio::test]
    async fn test_short_circuit_skips_rest_of_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let upstream = Arc::new(RecordingUpstream::default());
        let chain = InterceptorChain::new(
            vec![stage("before", -1, &log), Arc::new(ShortCircuit), stage("after", 1, &log)],
            upstream.clone(),
        )
        .unwrap();

        let response = chain.handle(request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(*log.lock().unwrap(), vec!["before"]);
        assert!(upstream.seen().is_empty());
    }

    #[tokio::test]
    async fn test_empty_chain_dispatches_directly() {
        let upstream = Arc::new(RecordingUpstream::default());
        let chain = InterceptorChain::new(Vec::new(), upstream.clone()).unwrap();

        chain.handle(request("/direct")).await.unwrap();
        assert_eq!(upstream.seen()[0].path, "/direct");
    }
}
