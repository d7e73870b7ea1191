use smartcity_core::weather::WeatherClient;
use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;

/// Fetches the badge temperature. Errors carry the user-facing message.
pub async fn fetch_weather(client: WeatherClient, cancel: CancellationToken) -> UiEvent {
    let result = client
        .fetch_temperature(&cancel)
        .await
        .map_err(|err| err.to_string());
    UiEvent::WeatherLoaded { result }
}
