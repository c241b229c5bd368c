//! Device quota integration tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{assert_success, test_client, test_device_sn};

    #[tokio::test]
    #[ignore = "requires EcoFlow credentials"]
    async fn test_should_get_all_quota_values() {
        let client = test_client();
        let sn = test_device_sn();

        let response = client.get_all_quotas(&sn).await.unwrap();

        assert_success(&response);
    }

    #[tokio::test]
    #[ignore = "requires EcoFlow credentials"]
    async fn test_should_get_xboost_switch() {
        let client = test_client();
        let sn = test_device_sn();

        let response = client
            .get_quotas(&sn, &["inv.cfgAcEnabled", "inv.cfgAcXboost"])
            .await
            .unwrap();

        assert_success(&response);
    }

    #[tokio::test]
    #[ignore = "requires EcoFlow credentials and switches the device's AC output on"]
    async fn test_should_turn_on_ac() {
        let client = test_client();
        let sn = test_device_sn();

        let response = client
            .set_quota(
                &sn,
                json!({ "cmdSet": 32, "id": 66, "enabled": 1, "xboost": 1 }),
            )
            .await
            .unwrap();

        assert_success(&response);
    }
}
