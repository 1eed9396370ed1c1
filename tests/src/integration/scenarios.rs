//! # End-to-End Scenarios
//!
//! Each test walks one user-visible flow through the full middleware
//! pipeline:
//!
//! 1. **Customers**: create, then list with the store-assigned id
//! 2. **Report runs**: create, cost, pay, then see the revenue summary
//! 3. **Admin gate**: non-admin token is forbidden, admin token succeeds
//! 4. **Rate limit**: the request beyond the burst is rejected with 429
//! 5. **Timeout**: a stalled handler yields 503 and the server stays up

#[cfg(test)]
mod tests {
    use super::super::{send, TestGateway, ADMIN, USER};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use nhd_gateway::GatewayConfig;
    use nhd_store::{
        Customer, CustomerId, Datastore, FinancialsSummary, MemStore, Payment, ReportCost,
        ReportRun, ReportRunId, ReportStatus, StoreResult, User,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    /// Store whose customer listing stalls.
    struct SlowStore {
        inner: Arc<MemStore>,
        delay: Duration,
    }

    #[async_trait]
    impl Datastore for SlowStore {
        async fn create_customer(&self, customer: Customer) -> StoreResult<CustomerId> {
            self.inner.create_customer(customer).await
        }
        async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
            tokio::time::sleep(self.delay).await;
            self.inner.list_customers().await
        }
        async fn create_report_run(&self, run: ReportRun) -> StoreResult<ReportRunId> {
            self.inner.create_report_run(run).await
        }
        async fn list_report_runs(&self, filter: &str) -> StoreResult<Vec<ReportRun>> {
            self.inner.list_report_runs(filter).await
        }
        async fn append_report_cost(&self, run_id: &str, cost: ReportCost) -> StoreResult<()> {
            self.inner.append_report_cost(run_id, cost).await
        }
        async fn set_report_payment(&self, run_id: &str, payment: Payment) -> StoreResult<()> {
            self.inner.set_report_payment(run_id, payment).await
        }
        async fn update_report_status(
            &self,
            run_id: &str,
            status: ReportStatus,
        ) -> StoreResult<()> {
            self.inner.update_report_status(run_id, status).await
        }
        async fn get_user(&self, uid: &str) -> StoreResult<User> {
            self.inner.get_user(uid).await
        }
        async fn create_user(&self, user: User) -> StoreResult<()> {
            self.inner.create_user(user).await
        }
        async fn compute_financials_summary(&self) -> StoreResult<FinancialsSummary> {
            self.inner.compute_financials_summary().await
        }
        async fn ping(&self) -> StoreResult<()> {
            self.inner.ping().await
        }
    }

    async fn slow_gateway(timeout: Duration, delay: Duration) -> TestGateway {
        let mut config = GatewayConfig::default();
        config.timeouts.request = timeout;
        config.rate_limit.requests_per_second = 10_000.0;
        config.rate_limit.burst_size = 10_000;

        let store = Arc::new(MemStore::new());
        let backend = Arc::new(SlowStore {
            inner: store.clone(),
            delay,
        });
        TestGateway::with_store(config, store, backend).await
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_customer_is_listed_with_its_assigned_id() {
        let gw = TestGateway::new().await;
        let router = gw.router();

        let (status, created) = send(
            &router,
            Method::POST,
            "/customers",
            None,
            Some(json!({"full_name": "Alice", "email": "alice@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["customer_id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        let (status, customers) = send(&router, Method::GET, "/customers", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let customers = customers.as_array().unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0]["customer_id"], id.as_str());
        assert_eq!(customers[0]["full_name"], "Alice");
    }

    #[tokio::test]
    async fn test_report_run_from_creation_to_revenue() {
        let gw = TestGateway::new().await;
        let router = gw.router();
        let mut worker = gw.publisher.subscribe();

        let (_, customer) = send(
            &router,
            Method::POST,
            "/customers",
            None,
            Some(json!({"full_name": "Alice", "email": "alice@example.com"})),
        )
        .await;
        let customer_id = customer["customer_id"].as_str().unwrap();

        let (status, created) = send(
            &router,
            Method::POST,
            "/report-runs",
            None,
            Some(json!({"customer_id": customer_id, "property_address_id": "12 Elm St"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let run_id = created["report_run_id"].as_str().unwrap().to_string();

        // A subscribed worker sees the new run id
        let message = tokio::time::timeout(Duration::from_secs(1), worker.recv())
            .await
            .expect("message delivered")
            .unwrap();
        assert_eq!(message.data, run_id.as_bytes());

        let (_, runs) = send(&router, Method::GET, "/report-runs", None, None).await;
        assert_eq!(runs[0]["status"], "PENDING");
        assert_eq!(runs[0]["cost_history"], json!([]));

        let (status, _) = send(
            &router,
            Method::PUT,
            &format!("/report-runs/{run_id}/cost"),
            Some(ADMIN),
            Some(json!({"amount": 100.0, "currency": "USD"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, runs) = send(&router, Method::GET, "/report-runs", None, None).await;
        assert_eq!(runs[0]["cost_history"].as_array().unwrap().len(), 1);
        assert_eq!(runs[0]["cost_history"][0]["amount"], 100.0);

        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/report-runs/{run_id}/payment"),
            Some(ADMIN),
            Some(json!({"amount_paid": 100.0, "currency": "USD", "status": "PAID"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, summary) =
            send(&router, Method::GET, "/financials/summary", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_revenue"], 100.0);
        let paid = summary["paid_reports"].as_array().unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0]["customer_name"], "Alice");
        assert_eq!(paid[0]["amount_paid"], 100.0);
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let gw = TestGateway::new().await;
        let router = gw.router();
        let register = json!({"user_id": "new-uid", "permissions": {"is_admin": false}});

        let (status, body) = send(
            &router,
            Method::POST,
            "/users/register",
            Some(USER),
            Some(register.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, _) = send(
            &router,
            Method::POST,
            "/users/register",
            None,
            Some(register.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &router,
            Method::POST,
            "/users/register",
            Some(ADMIN),
            Some(register),
        )
        .await;
        assert!(status.is_success());
        assert!(gw.store.user("new-uid").is_ok());
    }

    #[tokio::test]
    async fn test_request_beyond_burst_is_rate_limited() {
        let mut config = GatewayConfig::default();
        config.rate_limit.requests_per_second = 1.0;
        config.rate_limit.burst_size = 1;
        let gw = TestGateway::with_config(config).await;
        let router = gw.router();

        let first = router
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = second.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after >= 1);

        let counts = gw.service.metrics().snapshot();
        assert_eq!(counts.get(&429), Some(&1));
    }

    #[tokio::test]
    async fn test_slow_handler_times_out_and_server_keeps_serving() {
        let gw = slow_gateway(Duration::from_millis(50), Duration::from_secs(5)).await;
        let router = gw.router();

        let started = std::time::Instant::now();
        let (status, body) = send(&router, Method::GET, "/customers", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "service_unavailable");
        assert!(started.elapsed() < Duration::from_secs(2));

        let (status, _) = send(&router, Method::GET, "/healthz", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&router, Method::GET, "/report-runs", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_timeout_over_a_real_socket() {
        let gw = slow_gateway(Duration::from_millis(50), Duration::from_secs(5)).await;
        let metrics = gw.service.metrics();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(gw.service.serve(listener, async move {
            let _ = shutdown_rx.await;
        }));

        let client = reqwest::Client::new();
        let slow = client
            .get(format!("http://{addr}/customers"))
            .send()
            .await
            .unwrap();
        assert_eq!(slow.status().as_u16(), 503);

        let health = client
            .get(format!("http://{addr}/healthz"))
            .send()
            .await
            .unwrap();
        assert_eq!(health.status().as_u16(), 200);
        assert_eq!(health.text().await.unwrap(), "ok");
        drop(client);

        let _ = shutdown_tx.send(());
        server.await.unwrap().unwrap();

        let counts = metrics.snapshot();
        assert_eq!(counts.get(&503), Some(&1));
        assert_eq!(counts.get(&200), Some(&1));
    }
}
