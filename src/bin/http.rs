#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use batch_scheduler::{BatchRegister, WorkCalendar, http_api, load_calendar_config};

    env_logger::init();

    let addr: SocketAddr = std::env::var("BATCH_SCHEDULER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let calendar = match std::env::var("BATCH_SCHEDULER_CALENDAR") {
        Ok(path) => {
            let config = load_calendar_config(&path)?;
            log::info!("loaded organization calendar from {path}");
            WorkCalendar::from_config(&config)?
        }
        Err(_) => WorkCalendar::default(),
    };

    println!("batch-scheduler HTTP API listening on http://{addr}");
    http_api::serve(addr, BatchRegister::new(calendar)).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
