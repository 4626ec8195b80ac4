use pico_args::Arguments;
use slick::{GenerationOptions, Protocol, SamplingParams, Stop};

pub const SERVER_ADDRESS_VAR: &str = "SLICK_SERVER_ADDRESS";
pub const DEFAULT_SERVER_ADDRESS: &str = "http://127.0.0.1:8080";

pub const HELP: &str = "\
Generate text from a prompt template, optionally filled from standard input

USAGE:
  slick_client [OPTIONS] PROMPT

  PROMPT may contain one placeholder:
    {stdin}         All of standard input, one generation
    {stdin_line}    Each line of standard input, one generation per line
    {stdin_stream}  Same as {stdin_line} (stateful streaming isn't implemented)

  Every generation is ended with a newline (if missing) and a NUL byte.

OPTIONS:
  --server-address  Server base URL       [default: $SLICK_SERVER_ADDRESS or http://127.0.0.1:8080]
  --protocol        chat or completion    [default: chat]
  --max-length      Maximum new tokens    [default: 500]
  --temperature     Sampling temperature  [default: 0.2]
  --top-k           Top-k sampling        [default: 40]
  --top-p           Top-p sampling        [default: 0.9]
  --stop            Stop sequence, may be repeated  [default: <|end_of_text|>]

FLAGS:
  --do-stream       Print text as it's generated (default)
  --dont-stream     Wait for the whole response before printing, even
                    when --do-stream is also given
  -h, --help        Print help information
";

/// Server address from the environment (or a `.env` file), falling back to
/// a local llama.cpp server.
pub fn server_address_from_env() -> String {
    server_address(dotenvy::var(SERVER_ADDRESS_VAR))
}

fn server_address(var: Result<String, dotenvy::Error>) -> String {
    var.unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

#[derive(Debug)]
pub struct Args {
    pub prompt: String,
    pub server_address: String,
    pub options: GenerationOptions,
}

impl Args {
    pub fn parse(
        mut pargs: Arguments,
        default_server_address: String,
    ) -> Result<Self, pico_args::Error> {
        let defaults = GenerationOptions::default();
        let SamplingParams {
            temperature,
            top_k,
            top_p,
            ..
        } = defaults.sampling;

        // Streaming is on unless explicitly turned off, whatever the order.
        let _ = pargs.contains("--do-stream");
        let stream = !pargs.contains("--dont-stream");

        let server_address = pargs
            .opt_value_from_str("--server-address")?
            .unwrap_or(default_server_address);
        let protocol: Protocol = pargs.opt_value_from_str("--protocol")?.unwrap_or_default();
        let max_new_tokens: u32 = pargs
            .opt_value_from_str("--max-length")?
            .unwrap_or(defaults.max_new_tokens);
        if max_new_tokens == 0 {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: "--max-length must be positive".to_string(),
            });
        }
        let sampling = SamplingParams::builder()
            .temperature(pargs.opt_value_from_str("--temperature")?.unwrap_or(temperature))
            .top_k(pargs.opt_value_from_str("--top-k")?.unwrap_or(top_k))
            .top_p(pargs.opt_value_from_str("--top-p")?.unwrap_or(top_p))
            .stop(Stop::from(pargs.values_from_str::<_, String>("--stop")?))
            .build();

        let prompt: String = pargs.free_from_str()?;
        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: format!("unexpected arguments {remaining:?}"),
            });
        }

        let options = GenerationOptions::builder()
            .max_new_tokens(max_new_tokens)
            .sampling(sampling)
            .protocol(protocol)
            .stream(stream)
            .build();
        Ok(Self {
            prompt,
            server_address,
            options,
        })
    }
}
