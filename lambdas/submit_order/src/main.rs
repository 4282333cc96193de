use http_handler::{function_handler, HandlerDeps};
use lambda_http::{run, service_fn, tracing, Error};
use shared::adapters::MailChannelsMailer;
use shared::configuration::Configuration;
use shared::core::CuidGenerator;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let configuration = Configuration::load()?;
    // No explicit timeout here: the surrounding request lifecycle bounds
    // the outbound call.
    let http_client = shared::Client::builder().build()?;

    let deps = HandlerDeps {
        mailer: MailChannelsMailer::new(http_client, &configuration),
        id_generator: CuidGenerator::new(),
        configuration,
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}
