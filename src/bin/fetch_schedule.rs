use std::{error::Error, path::PathBuf};

use clap::Parser;
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::info;
use uust_schedule::{
    models::{FetchOptions, SemesterType},
    schedule::Schedule,
};

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Participant type: 1 for a student group, 2 for a teacher
/// 2. ID of the group or the teacher
/// 3. Academic year, e.g. 2023 for 2023/2024
/// 4. Semester type: 1 for autumn, 2 for spring. The current one when omitted
/// 5. Path to config.json, that contains the base url and the request timeout
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long)]
    participant_type: u32,
    #[arg(long)]
    participant_id: u32,
    #[arg(long)]
    academic_year: i32,
    #[arg(long)]
    semester_type: Option<u32>,
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    config_json_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging, stdout is reserved for events */
    env_logger::builder()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let options: FetchOptions = Figment::new()
        .merge(Json::file(&args.config_json_path))
        .merge(Env::prefixed("UUST_"))
        .extract()?;
    info!(
        "Read config from {}, fetching from {}",
        std::path::absolute(&args.config_json_path)?.display(),
        options.base_url
    );

    let schedule = Schedule::from_code(
        args.participant_type,
        args.participant_id,
        args.academic_year,
    )?;
    let semester_type = args.semester_type.map(SemesterType::try_from).transpose()?;

    /* Fetch the page and print events one per line */
    let page = schedule.fetch_events(semester_type, &options).await?;
    let mut count = 0;
    for event in page.events() {
        println!("{}", serde_json::to_string(&event?)?);
        count += 1;
    }
    info!("Printed {} events", count);

    Ok(())
}
