//! HTTP request bodies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::dto::CreateOrderDto;
use crate::domain::order_execution::value_objects::{OrderSide, OrderType, TimeInForce};

use super::error::HttpError;

/// Body of `POST /orders`.
///
/// Required fields are optional here so a missing one maps to a 400 with
/// a plain message instead of a deserializer error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Submitting client.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Symbol to trade.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Order side.
    #[serde(default)]
    pub side: Option<OrderSide>,
    /// Requested amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Order type, market when absent.
    #[serde(default, rename = "type")]
    pub order_type: Option<OrderType>,
    /// Limit price (limit orders).
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    /// Time in force.
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    /// Any other attributes, stored with the order.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<CreateOrderRequest> for CreateOrderDto {
    type Error = HttpError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        let (Some(client_id), Some(symbol), Some(side), Some(amount)) = (
            request.client_id.filter(|s| !s.is_empty()),
            request.symbol.filter(|s| !s.is_empty()),
            request.side,
            request.amount,
        ) else {
            return Err(HttpError::BadRequest("missing fields".to_string()));
        };

        Ok(Self {
            client_id,
            symbol,
            side,
            order_type: request.order_type.unwrap_or_default(),
            amount,
            limit_price: request.limit_price,
            time_in_force: request.time_in_force,
            extra: request.extra,
        })
    }
}

/// Query string of `GET /ws`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    /// Connection ID to register under; generated when absent.
    #[serde(default)]
    pub client_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn parses_camel_case_body_with_extras() {
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "clientId": "c-1",
            "symbol": "ETH/USDT",
            "side": "buy",
            "amount": 5,
            "type": "limit",
            "limitPrice": 100,
            "timeInForce": "IOC",
            "strategy": "twap"
        }))
        .unwrap();

        let dto = CreateOrderDto::try_from(request).unwrap();

        assert_eq!(dto.client_id, "c-1");
        assert_eq!(dto.order_type, OrderType::Limit);
        assert_eq!(dto.amount, dec!(5));
        assert_eq!(dto.limit_price, Some(dec!(100)));
        assert_eq!(dto.time_in_force, Some(TimeInForce::Ioc));
        assert_eq!(dto.extra.get("strategy"), Some(&json!("twap")));
    }

    #[test]
    fn type_defaults_to_market() {
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "clientId": "c-1",
            "symbol": "ETH/USDT",
            "side": "sell",
            "amount": 1.5
        }))
        .unwrap();

        let dto = CreateOrderDto::try_from(request).unwrap();
        assert_eq!(dto.order_type, OrderType::Market);
        assert!(dto.extra.is_empty());
    }

    #[test]
    fn missing_side_is_rejected() {
        let request: CreateOrderRequest = serde_json::from_value(json!({
            "clientId": "c-1",
            "symbol": "ETH/USDT",
            "amount": 1
        }))
        .unwrap();

        let err = CreateOrderDto::try_from(request).unwrap_err();
        assert_eq!(err, HttpError::BadRequest("missing fields".to_string()));
    }
}
