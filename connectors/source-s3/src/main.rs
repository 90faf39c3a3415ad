use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut stdout = std::io::stdout();

    match source_s3::run(&args, &mut stdout, |source, args| {
        tributary_sdk::launch(source, args)
    }) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("source-s3 failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
