//! # Concurrency Tests
//!
//! Many clients hitting one gateway at once. The store must never lose an
//! append, never tear a payment record, and never hand out a duplicate id.

#[cfg(test)]
mod tests {
    use super::super::{send, TestGateway, ADMIN};
    use axum::http::{Method, StatusCode};
    use futures::future::join_all;
    use nhd_store::{Customer, PaymentStatus};
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;

    async fn new_run(gw: &TestGateway) -> String {
        let customer = gw
            .store
            .insert_customer(Customer::new("Alice", "alice@example.com"));
        let (status, body) = send(
            &gw.router(),
            Method::POST,
            "/report-runs",
            None,
            Some(json!({"customer_id": customer, "property_address_id": "addr-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["report_run_id"].as_str().unwrap().to_string()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_cost_updates_are_all_kept() {
        let gw = TestGateway::new().await;
        let run_id = new_run(&gw).await;
        let router = gw.router();

        let updates = (0..64).map(|i| {
            let router = router.clone();
            let uri = format!("/report-runs/{run_id}/cost");
            tokio::spawn(async move {
                send(
                    &router,
                    Method::PUT,
                    &uri,
                    Some(ADMIN),
                    Some(json!({"amount": i as f64, "currency": "USD"})),
                )
                .await
                .0
            })
        });
        for status in join_all(updates).await {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }

        let run = gw.store.report_run(&run_id).unwrap();
        assert_eq!(run.cost_history.len(), 64);
        let amounts: HashSet<u64> = run.cost_history.iter().map(|c| c.amount as u64).collect();
        assert_eq!(amounts.len(), 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_payments_leave_one_whole_record() {
        let gw = TestGateway::new().await;
        let run_id = new_run(&gw).await;
        let router = gw.router();

        let writes = (1..=32).map(|i| {
            let router = router.clone();
            let uri = format!("/report-runs/{run_id}/payment");
            tokio::spawn(async move {
                send(
                    &router,
                    Method::POST,
                    &uri,
                    Some(ADMIN),
                    Some(json!({
                        "amount_paid": i as f64,
                        "currency": format!("C{i}"),
                        "status": "PAID",
                    })),
                )
                .await
                .0
            })
        });
        for status in join_all(writes).await {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }

        // Amount and currency must come from the same write
        let payment = gw.store.report_run(&run_id).unwrap().payment_details.unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.currency, format!("C{}", payment.amount_paid as u64));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_creates_get_distinct_ids() {
        let gw = TestGateway::new().await;
        let router = gw.router();

        let creates = (0..50).map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let (status, body) = send(
                    &router,
                    Method::POST,
                    "/customers",
                    None,
                    Some(json!({"full_name": format!("Customer {i}")})),
                )
                .await;
                assert_eq!(status, StatusCode::CREATED);
                body["customer_id"].as_str().unwrap().to_string()
            })
        });
        let ids: HashSet<String> = join_all(creates)
            .await
            .into_iter()
            .map(|id| id.unwrap())
            .collect();
        assert_eq!(ids.len(), 50);

        let (_, customers) = send(&router, Method::GET, "/customers", None, None).await;
        assert_eq!(customers.as_array().unwrap().len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_summary_reads_during_payments_stay_consistent() {
        let gw = TestGateway::new().await;
        let router = gw.router();
        let mut runs = Vec::new();
        for _ in 0..10 {
            runs.push(new_run(&gw).await);
        }

        let writers = runs.iter().map(|run_id| {
            let router = router.clone();
            let uri = format!("/report-runs/{run_id}/payment");
            tokio::spawn(async move {
                send(
                    &router,
                    Method::POST,
                    &uri,
                    Some(ADMIN),
                    Some(json!({"amount_paid": 10.0, "status": "PAID"})),
                )
                .await
                .0
            })
        });
        let readers = (0..20).map(|_| {
            let router = router.clone();
            tokio::spawn(async move {
                send(&router, Method::GET, "/financials/summary", None, None)
                    .await
                    .1
            })
        });

        let (written, summaries) = tokio::join!(join_all(writers), join_all(readers));
        for status in written {
            assert_eq!(status.unwrap(), StatusCode::OK);
        }
        // Every snapshot's total matches its own paid list
        for summary in summaries {
            let summary = summary.unwrap();
            let paid = summary["paid_reports"].as_array().unwrap().len() as f64;
            assert_eq!(summary["total_revenue"].as_f64().unwrap(), paid * 10.0);
        }

        let (_, summary) = send(&router, Method::GET, "/financials/summary", None, None).await;
        assert_eq!(summary["total_revenue"], 100.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Costs posted one after another come back in the same order.
        #[test]
        fn prop_cost_history_keeps_request_order(amounts in prop::collection::vec(0u32..10_000, 1..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let history = runtime.block_on(async {
                let gw = TestGateway::new().await;
                let run_id = new_run(&gw).await;
                let router = gw.router();
                for amount in &amounts {
                    let (status, _) = send(
                        &router,
                        Method::PUT,
                        &format!("/report-runs/{run_id}/cost"),
                        Some(ADMIN),
                        Some(json!({"amount": *amount as f64, "currency": "USD"})),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK);
                }
                gw.store.report_run(&run_id).unwrap().cost_history
            });

            let got: Vec<u32> = history.iter().map(|c| c.amount as u32).collect();
            prop_assert_eq!(got, amounts);
        }
    }
}
