use async_stream::try_stream;
use futures::{StreamExt, pin_mut, stream::BoxStream};
use tracing::{debug, warn};
use url::Url;

use crate::{
    accumulator::Accumulator,
    decoder,
    error::{Result, SlickError},
    models::{
        request::{GenerationOptions, GenerationRequest, Protocol},
        response::Fragment,
    },
    parser::{self, Delta},
};

/// Lazy, ordered fragments of one generation. Dropping it early closes the
/// connection without reading the rest of the body.
pub type FragmentStream = BoxStream<'static, Result<Fragment>>;

/// A backend that turns prompts into generated text.
pub trait RemoteModel {
    fn build_request(&self, prompt: &str, options: &GenerationOptions) -> GenerationRequest;

    /// Nothing is sent until the returned stream is first polled.
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> FragmentStream;
}

#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub base_url: String,
}

/// Client for llama.cpp's HTTP server (or anything speaking the same
/// chat completions and completion protocols).
#[derive(Clone, Debug)]
pub struct LlamaCppClient {
    base_url: String,
    client: reqwest::Client,
}

impl LlamaCppClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let HttpClientConfig { base_url } = config;
        let invalid = |reason: String| SlickError::InvalidUrl {
            url: base_url.clone(),
            reason,
        };
        let url = Url::parse(&base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        // Connections are never parked for reuse. Each generation's
        // connection lives exactly as long as its fragment stream.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches("/").to_string(),
            client,
        })
    }

    pub fn url(&self, protocol: Protocol) -> String {
        format!("{}{}", self.base_url, protocol.endpoint())
    }
}

impl RemoteModel for LlamaCppClient {
    fn build_request(&self, prompt: &str, options: &GenerationOptions) -> GenerationRequest {
        GenerationRequest::new(prompt, options.clone())
    }

    fn generate(&self, prompt: &str, options: &GenerationOptions) -> FragmentStream {
        let request = self.build_request(prompt, options);
        let url = self.url(request.protocol());
        let client = self.client.clone();
        let fragments = try_stream! {
            let protocol = request.protocol();
            debug!("posting {protocol} request to {url} (stream={})", request.stream());
            let response = post(&client, &url, &request).await?;

            if request.stream() {
                let lines = decoder::decode_lines(response.bytes_stream());
                pin_mut!(lines);
                let mut accumulator = Accumulator::new();
                let mut terminated = false;
                while let Some(line) = lines.next().await {
                    match parser::parse_line(&line?, protocol)? {
                        Delta::Terminal => {
                            terminated = true;
                            break;
                        }
                        Delta::Fields(deltas) => accumulator.apply(deltas),
                        Delta::Text(text) => {
                            yield Fragment::Text(text);
                        }
                    }
                }
                if terminated {
                    debug!("chat stream finished");
                    yield Fragment::Accumulated(accumulator.snapshot());
                    accumulator.reset();
                } else if protocol == Protocol::Chat {
                    warn!("chat stream closed before [DONE], discarding partial result");
                }
            } else {
                let body = response.text().await?;
                yield parser::parse_body(&body, protocol)?;
            }
        };
        fragments.boxed()
    }
}

/// Sends the request and checks the status before any of the body is read.
async fn post(
    client: &reqwest::Client,
    url: &str,
    request: &GenerationRequest,
) -> Result<reqwest::Response> {
    let response = client.post(url).json(&request.body()).send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|err| format!("{err:?}"));
    Err(SlickError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Result<LlamaCppClient> {
        LlamaCppClient::new(HttpClientConfig {
            base_url: base_url.to_string(),
        })
    }

    #[test]
    fn endpoint_urls_keep_base_path() {
        let client = client("http://127.0.0.1:8080/").unwrap();
        assert_eq!(
            client.url(Protocol::Chat),
            "http://127.0.0.1:8080/chat/completions"
        );
        let client = self::client("https://models.internal/v1").unwrap();
        assert_eq!(
            client.url(Protocol::Completion),
            "https://models.internal/v1/completion"
        );
    }

    #[test]
    fn rejects_unusable_urls() {
        for url in ["127.0.0.1:8080", "localhost:8080", "ftp://host"] {
            assert!(matches!(client(url), Err(SlickError::InvalidUrl { .. })), "{url}");
        }
    }

    #[test]
    fn requests_carry_options_unchanged() {
        let client = client("http://127.0.0.1:8080").unwrap();
        let options = GenerationOptions::builder()
            .protocol(Protocol::Completion)
            .stream(false)
            .build();
        let request = client.build_request("hello", &options);
        assert_eq!(request.prompt(), "hello");
        assert_eq!(request.options(), &options);
    }
}
