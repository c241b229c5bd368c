//! Device listing integration tests.

#[cfg(test)]
mod tests {
    use ecoflow_http::RequestBody;
    use http::Method;

    use crate::{assert_success, test_client};

    #[tokio::test]
    #[ignore = "requires EcoFlow credentials"]
    async fn test_should_list_devices() {
        let client = test_client();

        let response = client.list_devices().await.unwrap();

        assert_success(&response);
    }

    #[tokio::test]
    #[ignore = "requires EcoFlow credentials"]
    async fn test_should_return_ok_for_raw_signed_request() {
        let client = test_client();

        let request = client
            .new_request::<RequestBody>(Method::GET, "/iot-open/sign/device/list", None)
            .unwrap();
        let response = client.execute(request).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["code"], "0");
    }
}
