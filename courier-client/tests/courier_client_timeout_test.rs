use courier_api::CouriersServer;
use courier_client::pb::{GetCourierRequest, SearchCouriersRequest};
use courier_client::{CallOptions, ClientOptions, CourierClient};
use courier_service_impl::CourierServiceImpl;
use std::time::Duration;
use tonic::Code;

mod courier_service_impl;

fn slow_client(
    delay: Duration,
    options: ClientOptions,
) -> CourierClient<CouriersServer<CourierServiceImpl>> {
    let service = CouriersServer::new(CourierServiceImpl::with_delay(delay));
    CourierClient::from_service(service, options).expect("failed to build courier client")
}

#[tokio::test(start_paused = true)]
async fn test_call_timeout_yields_deadline_exceeded() {
    let client = slow_client(
        Duration::from_secs(30),
        ClientOptions::default().with_call_timeout(Duration::from_secs(1)),
    );

    let status = client
        .get_courier(GetCourierRequest {
            id: "courier-1".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::DeadlineExceeded);
}

#[tokio::test(start_paused = true)]
async fn test_dial_timeout_does_not_bound_calls() {
    let client = slow_client(
        Duration::from_secs(2),
        ClientOptions::default().with_dial_timeout(Duration::from_millis(10)),
    );

    let resp = client
        .search_couriers(SearchCouriersRequest::default())
        .await
        .unwrap();

    assert!(resp.couriers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_per_call_timeout_override() {
    let client = slow_client(Duration::from_secs(2), ClientOptions::default());

    let status = client
        .search_couriers_with(
            SearchCouriersRequest::default(),
            CallOptions::new().timeout(Duration::from_millis(500)),
        )
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);

    let resp = client
        .search_couriers_with(
            SearchCouriersRequest::default(),
            CallOptions::new().timeout(Duration::from_secs(5)),
        )
        .await;
    assert!(resp.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_call_cancels_it() {
    let client = slow_client(Duration::from_secs(60), ClientOptions::default());

    let call = client.search_couriers(SearchCouriersRequest::default());
    let cancelled = tokio::time::timeout(Duration::from_millis(100), call).await;
    assert!(cancelled.is_err());

    // The client stays usable after a cancelled call.
    assert!(!client.is_closed());
    let status = client
        .search_couriers_with(
            SearchCouriersRequest::default(),
            CallOptions::new().timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_call_timeout() {
    let client = slow_client(
        Duration::from_secs(2),
        ClientOptions::default().with_call_timeout(Duration::MAX),
    );
    assert_eq!(client.options().call_timeout, Duration::MAX);

    let resp = client
        .search_couriers(SearchCouriersRequest::default())
        .await
        .unwrap();
    assert!(resp.couriers.is_empty());

    let resp = client
        .search_couriers_with(
            SearchCouriersRequest::default(),
            CallOptions::new().timeout(Duration::MAX),
        )
        .await;
    assert!(resp.is_ok());
}
