use futures::StreamExt;
use slick::{GenerationOptions, RemoteModel, SlickError};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompt::{self, PromptMode};

/// Byte written after every finished generation so that a consumer can split
/// concatenated outputs apart again.
pub const RECORD_SEPARATOR: u8 = b'\0';

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Generation(#[from] SlickError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Runs every generation the template asks for, one after another. The
/// first failure stops the run; output already written stays written.
pub async fn run<M, R, W>(
    model: &M,
    template: &str,
    mode: PromptMode,
    input: R,
    output: &mut W,
    options: &GenerationOptions,
) -> Result<(), DriverError>
where
    M: RemoteModel,
    R: BufRead,
    W: Write,
{
    match mode {
        PromptMode::Block => {
            let prompt = prompt::block_prompt(template, input)?;
            generate_one(model, &prompt, options, output).await
        }
        PromptMode::LineWise | PromptMode::Stream => {
            if mode == PromptMode::Stream {
                warn!("stateful streaming isn't implemented, generating line by line");
            }
            // TODO: lines are independent, so they could be batched into
            // concurrent requests once output ordering is buffered.
            for line in input.lines() {
                let prompt = prompt::line_prompt(template, mode, &line?);
                generate_one(model, &prompt, options, output).await?;
            }
            Ok(())
        }
    }
}

/// Writes a generation's text as it arrives, then terminates the record.
/// Nothing at all is written when the model produces no fragments.
pub async fn generate_one<M, W>(
    model: &M,
    prompt: &str,
    options: &GenerationOptions,
    output: &mut W,
) -> Result<(), DriverError>
where
    M: RemoteModel,
    W: Write,
{
    debug!("generating for \"{prompt}\"");
    let mut fragments = model.generate(prompt, options);
    let mut produced = false;
    let mut last_byte = None;
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        produced = true;
        if let Some(content) = fragment.content() {
            output.write_all(content.as_bytes())?;
            output.flush()?;
            if let Some(&byte) = content.as_bytes().last() {
                last_byte = Some(byte);
            }
        }
    }

    if produced {
        if last_byte != Some(b'\n') {
            output.write_all(b"\n")?;
        }
        output.write_all(&[RECORD_SEPARATOR])?;
        output.flush()?;
    }
    Ok(())
}
