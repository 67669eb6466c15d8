use check_result::{
    models::now_millis, sort_for_display, CheckError, CheckRecord, ResultWriter, StepTimer,
    ThresholdSettings,
};
use tracing_subscriber::EnvFilter;

const SETTINGS: &str = r#"{ "warningTime": 3, "criticalTime": 5 }"#;

fn run_check(name: &str, settings: &ThresholdSettings, fail: bool) -> anyhow::Result<CheckRecord> {
    let mut record = CheckRecord::check(name);
    settings.apply(&mut record)?;

    let start = now_millis();
    record.set_start(Some(start));

    // Simulated UI actions, timed as steps.
    let mut steps = StepTimer::for_check(start);
    steps.end_of_step("open login page", Some(1), start + 800);
    steps.end_of_step("submit credentials", Some(2), start + 2_300);
    for step in steps.steps() {
        tracing::info!(step = step.name().unwrap_or_default(), duration = step.duration(), "step done");
    }

    if fail {
        record.add_exception(CheckError::action("logout link not visible"));
        record.add_exception(CheckError::with_screenshot(
            "session still active",
            "screenshots/logout.png",
        ));
    }

    record.set_stop(Some(start + 2_500));
    record.refresh_state();
    Ok(record)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ThresholdSettings::from_json(SETTINGS)?;

    let mut records = vec![
        run_check("logout-check", &settings, true)?,
        run_check("login-check", &settings, false)?,
    ];
    sort_for_display(&mut records);
    for record in &records {
        println!("{}", record.result_string());
    }

    let mut writer = ResultWriter::with_results_dir("check-results").with_suite("example");
    writer.record_all(&mut records)?;
    for path in writer.flush()? {
        println!("wrote {}", path.display());
    }

    Ok(())
}
