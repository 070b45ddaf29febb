//! Interactive line-oriented front end.
//!
//! Reads one brief per line, runs it through the pipeline and prints each
//! stage. `q` or end of input stops the loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::pipeline::{BriefPipeline, PipelineOutcome};

const RULE: &str = "--------------------";
const BANNER_RULE: &str = "--------------------------------------";
const PROMPT: &str = "Enter a brief for a new Asana task: ";

/// Drive the console loop until the user quits or input ends.
///
/// Pipeline failures are printed and the loop continues; only I/O errors on
/// `reader` or `writer` end it early.
pub async fn run<R, W>(pipeline: &BriefPipeline, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(
            format!(
                "\n{}\nStarting Asana Task Creation Agent (q to quit)\n{}\n",
                BANNER_RULE, BANNER_RULE
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = reader.lines();
    loop {
        writer.write_all(format!("\n{}", PROMPT).as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let brief = line.trim();
        if brief.eq_ignore_ascii_case("q") {
            break;
        }
        if brief.is_empty() {
            continue;
        }

        tracing::info!("Console brief received ({} chars)", brief.chars().count());
        let outcome = pipeline.run(brief, &[]).await;
        writer
            .write_all(render_outcome(brief, &outcome).as_bytes())
            .await?;
    }

    writer.flush().await?;
    Ok(())
}

fn render_outcome(brief: &str, outcome: &PipelineOutcome) -> String {
    let mut out = String::new();

    if let Some(refined) = &outcome.refined_brief {
        out.push_str(&format!("\n--- Refined Brief ---\n{}\n{}\n", refined, RULE));
    }

    let (status, result) = match &outcome.result {
        Ok(task) => {
            let mut result = format!("Created task {}: {}", task.gid, task.name);
            if let Some(url) = &task.permalink_url {
                result.push_str(&format!("\n{}", url));
            }
            ("success", result)
        }
        Err(e) => {
            tracing::error!("Console brief failed: {}", e);
            ("error", format!("Error: {}", e))
        }
    };
    out.push_str(&format!(
        "\n--- Asana Task Creation Result ---\n{}\n{}\n",
        result, RULE
    ));

    out.push_str(&format!(
        "\n--- Final State ---\nraw_brief: {}\nrefined_brief: {}\nstatus: {}\n{}\n",
        brief,
        if outcome.refined_brief.is_some() { "present" } else { "missing" },
        status,
        RULE
    ));

    out
}
