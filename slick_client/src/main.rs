use pico_args::Arguments;
use slick::{HttpClientConfig, LlamaCppClient};
use slick_client::{
    config::{self, Args},
    driver,
    prompt::PromptMode,
};
use std::io;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        println!("{}", config::HELP);
        std::process::exit(0);
    }

    slick_client::init_tracing();

    // Exit the way a shell expects after an interrupt.
    ctrlc::set_handler(|| std::process::exit(130))?;

    let Args {
        prompt,
        server_address,
        options,
    } = Args::parse(pargs, config::server_address_from_env())?;
    let model = LlamaCppClient::new(HttpClientConfig {
        base_url: server_address,
    })?;

    // The mode is fixed for the whole run by the template's placeholder.
    let mode = PromptMode::detect(&prompt);
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    driver::run(&model, &prompt, mode, stdin, &mut stdout, &options).await?;
    Ok(())
}
