mod alarm;
mod command;
mod config;
mod device;
mod recorder;
mod routines;
mod session;
mod stop;

use config::AppConfig;
use device::{Device, DryRunDevice};
use finch_shared::codec::format_script;
use routines::{Routine, RoutinePerformer};
use session::{Session, SessionError};
use stop::StopSignal;
use tokio::time::Instant;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env()?;

    info!("[MAIN] Finch control starting: {}", config.device_name);
    if let Some(timeout) = config.run_timeout {
        info!("[MAIN]   run timeout: {:?}", timeout);
    }

    let mut session = Session::new();
    if let Some(script) = config.script.clone() {
        info!("[MAIN]   script: {}", format_script(&script));
        session.set_script(script);
    }
    if let Some(parameters) = config.parameters {
        info!("[MAIN]   parameters: {}", parameters);
        session.set_parameters(parameters);
    }
    if let Some(alarm) = config.alarm {
        session.set_alarm(alarm);
    }
    if let Some(recorder) = config.recorder {
        session.set_recorder(recorder);
    }

    let (handle, mut stop) = StopSignal::new();
    if let Some(timeout) = config.run_timeout {
        stop = stop.with_deadline(Instant::now() + timeout);
    }

    // Ctrl-C stops whatever is running
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("[MAIN] Ctrl-C received, stopping");
                handle.stop();
            }
            Err(e) => error!("[MAIN] Could not listen for Ctrl-C: {}", e),
        }
    });

    let mut device = DryRunDevice::new(config.device_name.clone(), config.dry_run.clone());
    device::connect_device(&mut device).await?;

    let result = run(&session, &config, &mut device, stop).await;

    if let Err(e) = device::disconnect_device(&mut device).await {
        error!("[MAIN] Disconnect failed: {}", e);
    }

    match &result {
        Ok(()) => info!("[MAIN] Finch control finished"),
        Err(e) => error!("[MAIN] Run failed: {:#}", e),
    }
    result
}

/// Run every configured operation in turn: script, alarm, recording, routine
async fn run<D: Device>(
    session: &Session,
    config: &AppConfig,
    device: &mut D,
    stop: StopSignal,
) -> anyhow::Result<()> {
    let mut ran_anything = false;

    if !session.script().is_empty() {
        ran_anything = true;
        match session.run_script(device, stop.clone()).await {
            Ok(results) => {
                for (i, result) in results.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, result.feedback);
                }
            }
            Err(SessionError::Execution(e)) => {
                for (i, result) in e.completed().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, result.feedback);
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if session.alarm().is_some() {
        ran_anything = true;
        let outcome = session.run_alarm(device, stop.clone()).await?;
        match outcome.triggering_value {
            Some(value) if outcome.triggered => {
                println!("Alarm triggered after {}s by value {}", outcome.seconds_elapsed, value)
            }
            _ => println!("Alarm not triggered in {}s", outcome.seconds_elapsed),
        }
    }

    if session.recorder().is_some() {
        ran_anything = true;
        match session.run_recorder(device, stop.clone()).await {
            Ok(readings) => print!("{}", recorder::format_table(&readings)),
            Err(SessionError::Recorder(e)) => {
                let readings = match &e {
                    recorder::RecorderError::DeviceFault { readings, .. } => readings,
                    recorder::RecorderError::Stopped { readings, .. } => readings,
                };
                print!("{}", recorder::format_table(readings));
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(routine) = config.routine {
        ran_anything = true;
        perform(routine, device, stop).await?;
    }

    if !ran_anything {
        warn!("[MAIN] Nothing configured; set FINCH_SCRIPT, FINCH_ALARM, FINCH_RECORD or FINCH_ROUTINE");
    }
    Ok(())
}

async fn perform<D: Device>(routine: Routine, device: &mut D, stop: StopSignal) -> anyhow::Result<()> {
    let performed = RoutinePerformer::new(device, stop).perform(routine).await?;
    println!("Routine {} performed {} action(s)", routine, performed);
    Ok(())
}
