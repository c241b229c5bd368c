//! Typed calls for the device endpoints of the OpenPlatform API.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::{Client, RequestBody};
use crate::error::ClientError;
use crate::transport::HttpTransport;

/// Lists the devices bound to the account.
pub const DEVICE_LIST_PATH: &str = "/iot-open/sign/device/list";
/// Reads every quota of one device.
pub const QUOTA_ALL_PATH: &str = "/iot-open/sign/device/quota/all";
/// Reads selected quotas (`POST`) or sets one (`PUT`).
pub const QUOTA_PATH: &str = "/iot-open/sign/device/quota";

/// Response code the API uses for success.
pub const SUCCESS_CODE: &str = "0";

/// Envelope wrapped around every OpenPlatform response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// `"0"` on success, a vendor error code otherwise.
    pub code: String,
    /// Human-readable status.
    #[serde(default)]
    pub message: String,
    /// Endpoint-specific payload.
    #[serde(default)]
    pub data: Option<T>,
    /// Vendor trace id.
    #[serde(default)]
    pub eagle_eye_trace_id: Option<String>,
    /// Vendor transaction id.
    #[serde(default)]
    pub tid: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Whether the API reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl<T: HttpTransport> Client<T> {
    /// `GET /iot-open/sign/device/list`
    pub async fn list_devices(&self) -> Result<ApiResponse<Value>, ClientError> {
        let request = self.new_request::<RequestBody>(Method::GET, DEVICE_LIST_PATH, None)?;
        self.execute_json(request).await
    }

    /// `GET /iot-open/sign/device/quota/all?sn=<sn>`
    pub async fn get_all_quotas(&self, sn: &str) -> Result<ApiResponse<Value>, ClientError> {
        let request = self.new_request_with_query::<RequestBody>(
            Method::GET,
            QUOTA_ALL_PATH,
            &[("sn", sn)],
            None,
        )?;
        self.execute_json(request).await
    }

    /// `POST /iot-open/sign/device/quota` for the named quotas.
    pub async fn get_quotas(
        &self,
        sn: &str,
        quotas: &[&str],
    ) -> Result<ApiResponse<Value>, ClientError> {
        let payload = json!({ "sn": sn, "params": { "quotas": quotas } });
        let request = self.new_json_request(Method::POST, QUOTA_PATH, &payload)?;
        self.execute_json(request).await
    }

    /// `PUT /iot-open/sign/device/quota` with device-specific `params`.
    pub async fn set_quota(
        &self,
        sn: &str,
        params: Value,
    ) -> Result<ApiResponse<Value>, ClientError> {
        let payload = json!({ "sn": sn, "params": params });
        let request = self.new_json_request(Method::PUT, QUOTA_PATH, &payload)?;
        self.execute_json(request).await
    }
}
