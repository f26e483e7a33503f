//! Lists the hosted buttons of a sandbox account.
//!
//! ```sh
//! PAYPAL_USER=... PAYPAL_PWD=... PAYPAL_SIGNATURE=... cargo run --example button_search
//! ```

use paypal_nvp::{
    button_manager::ButtonManager,
    config::{Credentials, Environment},
    nvp::NvpClient,
    transport::{ReqwestTransport, TransportConfig},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let credentials = Credentials::builder()
        .user(std::env::var("PAYPAL_USER")?)
        .password(std::env::var("PAYPAL_PWD")?)
        .signature(std::env::var("PAYPAL_SIGNATURE")?)
        .build();

    let transport = ReqwestTransport::new(TransportConfig::default())?;
    let client = NvpClient::new(transport, credentials, Environment::Sandbox);
    let manager = ButtonManager::new(&client);

    match manager.search_buttons(None, None).await? {
        Some(buttons) => {
            for (index, button) in buttons {
                println!(
                    "#{index} {} {} {}",
                    button.id,
                    button.button_type.as_deref().unwrap_or("-"),
                    button.item_name.as_deref().unwrap_or("-"),
                );
            }
        }
        None => {
            for error in client.errors() {
                eprintln!("{error}");
            }
        }
    }

    Ok(())
}
