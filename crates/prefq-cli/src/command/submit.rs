use std::time::Duration;

use prefq_core::export::FeedbackDocument;
use reqwest::{
    StatusCode,
    blocking::{Client as HttpClient, RequestBuilder, multipart::Form},
    header::{ACCEPT, HeaderValue},
};
use tracing::info;

use crate::command::{RequestArg, StoreArg};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum SubmitFormat {
    /// Multipart form with `style_description`, `lambda` and `feedback_json` fields
    #[default]
    Form,
    /// The feedback document as a JSON body
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SubmitArg {
    #[clap(flatten)]
    store: StoreArg,
    #[clap(flatten)]
    request: RequestArg,
    /// Collection endpoint URL
    #[clap(long)]
    endpoint: String,
    #[clap(long, value_enum, default_value_t)]
    format: SubmitFormat,
    /// Request timeout in seconds
    #[clap(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub(crate) enum SubmitError {
    #[display("failed to reach {endpoint}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    #[display("the server rejected the submission ({status})")]
    Status { status: StatusCode },
}

pub(crate) fn run(arg: &SubmitArg) -> anyhow::Result<()> {
    let SubmitArg {
        store,
        request,
        endpoint,
        format,
        timeout_secs,
    } = arg;

    let mut feedback = store.open()?;
    let document = request.build_document(&feedback)?;
    let client = HttpClient::builder()
        .timeout(Duration::from_secs(*timeout_secs))
        .build()?;

    let http_error = |source| SubmitError::Http {
        endpoint: endpoint.clone(),
        source,
    };
    let response = build_request(&client, endpoint, *format, &document)?
        .send()
        .map_err(http_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SubmitError::Status { status }.into());
    }
    info!(%endpoint, %status, "feedback submitted");

    // the answers now live on the server
    feedback.clear()?;
    eprintln!(
        "Submitted {} responses for lambda {}",
        document.responses_recorded, document.lambda
    );
    Ok(())
}

fn build_request(
    client: &HttpClient,
    endpoint: &str,
    format: SubmitFormat,
    document: &FeedbackDocument,
) -> anyhow::Result<RequestBuilder> {
    let builder = client
        .post(endpoint)
        .header(ACCEPT, HeaderValue::from_static("application/json"));
    let builder = match format {
        SubmitFormat::Json => builder.json(document),
        SubmitFormat::Form => {
            let mut form = Form::new()
                .text("style_description", document.style_description.clone())
                .text("lambda", document.lambda.to_string())
                .text("feedback_json", serde_json::to_string_pretty(document)?);
            if let Some(annotator_id) = &document.annotator_id {
                form = form.text("annotator_id", annotator_id.clone());
            }
            builder.multipart(form)
        }
    };
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use prefq_core::{Lambda, Preference, export::ExportRequest};
    use reqwest::header::CONTENT_TYPE;

    use super::*;

    fn document() -> FeedbackDocument {
        let request = ExportRequest {
            style_description: "calm".to_owned(),
            annotator_id: Some("rater-1".to_owned()),
            allow_empty: false,
        };
        FeedbackDocument::build(
            Lambda::new("0.5"),
            [(
                "images/alg-x_episode_001_timestep_01.png".to_owned(),
                Preference::policy(1),
            )],
            vec![],
            &request,
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_json_request() {
        let client = HttpClient::new();
        let request = build_request(
            &client,
            "http://localhost:8000/feedback",
            SubmitFormat::Json,
            &document(),
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["lambda"], "0.5");
        assert_eq!(body["annotator_id"], "rater-1");
    }

    #[test]
    fn test_form_request() {
        let client = HttpClient::new();
        let request = build_request(
            &client,
            "http://localhost:8000/feedback",
            SubmitFormat::Form,
            &document(),
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.headers()[ACCEPT], "application/json");
        let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_status_error_message() {
        let error = SubmitError::Status {
            status: StatusCode::BAD_REQUEST,
        };
        assert_eq!(
            error.to_string(),
            "the server rejected the submission (400 Bad Request)"
        );
    }
}
