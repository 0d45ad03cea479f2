mod errors;
mod logging;
mod initialization;
mod handlers;
mod manager_estimate;
mod manager_pvwatts;
mod models;
mod chart;
mod report;

use actix_web::{middleware, web, App, HttpServer};
use actix_files::Files;
use log::info;
use crate::errors::UnrecoverableError;
use crate::handlers::{get_estimate, query_config};
use crate::initialization::{config, Config};

struct AppState {
    config: Config,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;
    let web_data = web::Data::new(AppState { config: config.clone() });

    info!("starting web server on {}:{}", config.web_server.bind_address, config.web_server.bind_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web_data.clone())
            .app_data(query_config())
            .wrap(middleware::Logger::default())
            .service(get_estimate)
            .service(
                web::scope("")
                    .wrap(middleware::DefaultHeaders::new().add(("Cache-Control", "no-cache")))
                    .service(Files::new("/", "./static").index_file("index.html"))
            )
    })
        .bind((config.web_server.bind_address.as_str(), config.web_server.bind_port))?
        .run()
        .await?;

    Ok(())
}
