//! Reading checkout requests from the command line.

use anyhow::{Context, Result};
use scmkit_core::{CheckoutRequest, ExternalCheckoutOptions};
use tokio::io::AsyncReadExt;

/// Read the `--input` value: literal JSON, or stdin when it is `-`.
pub(crate) async fn read_request(input: &str) -> Result<CheckoutRequest> {
    let json = if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read checkout request from stdin")?;
        buf
    } else {
        input.to_owned()
    };
    parse_request(&json)
}

/// Parse and validate a JSON wire record.
pub(crate) fn parse_request(json: &str) -> Result<CheckoutRequest> {
    let options: ExternalCheckoutOptions =
        serde_json::from_str(json).context("checkout request is not valid JSON")?;
    CheckoutRequest::try_from(options).context("invalid checkout request")
}
