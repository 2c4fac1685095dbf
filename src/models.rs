//! Domain and wire models for the sales dashboard core.
//!
//! `Sale` is the normalized record every consumer reads. `RawSale` mirrors the
//! CRM listing payload and is deliberately lenient: the upstream mixes
//! strings, numbers and nulls for the same field across records.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dates::parse_date;
use crate::error::CrmError;

/// Delivery date placeholder when the CRM has no scheduled date.
pub const DELIVERY_TBD: &str = "Por definir";

/// Contract number placeholder meaning "no contract issued yet".
pub const NO_CONTRACT: &str = "0";

// ============================================================================
// Domain Models
// ============================================================================

/// Delivery address of a sale, entity-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "calle")]
    pub street: String,
    pub comuna: String,
    pub region: String,
}

impl Address {
    /// `"street, comuna, region"` skipping empty parts.
    pub fn full(&self) -> String {
        [&self.street, &self.comuna, &self.region]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One house order pulled from the CRM, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    #[serde(rename = "cliente")]
    pub customer_name: String,
    #[serde(rename = "rut")]
    pub customer_rut: String,
    #[serde(rename = "telefono")]
    pub customer_phone: String,
    #[serde(rename = "direccion")]
    pub address: Address,
    /// CLP, never negative.
    #[serde(rename = "monto")]
    pub amount: u64,
    /// Brand plus size bucket, e.g. `"Casa Alerce 54 m²"`.
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "tipo_producto")]
    pub product_type: String,
    #[serde(rename = "forma_pago")]
    pub payment_method: String,
    /// `"YYYY-MM-DD HH:MM:SS"` as sent by the CRM.
    #[serde(rename = "fecha_venta")]
    pub sale_date: String,
    /// A date string or [`DELIVERY_TBD`].
    #[serde(rename = "fecha_entrega")]
    pub delivery_date: String,
    #[serde(rename = "ejecutivo_id")]
    pub executive_id: Option<String>,
    #[serde(rename = "nombre_ejecutivo")]
    pub executive_name: String,
    #[serde(rename = "rol_ejecutivo")]
    pub executive_role: String,
    /// `"Name (Role)"`; the grouping key for per-executive metrics.
    #[serde(rename = "ejecutivo")]
    pub executive: String,
    #[serde(rename = "subcategoria_ejecutivo")]
    pub executive_subcategory: String,
    pub supervisor: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "color_estado")]
    pub status_color: String,
    #[serde(rename = "observaciones")]
    pub observations: String,
    /// Contract/order number or [`NO_CONTRACT`].
    #[serde(rename = "numero_contrato")]
    pub contract_number: String,
}

impl Sale {
    /// Calendar day of the sale, if the timestamp parses.
    pub fn sale_day(&self) -> Option<NaiveDate> {
        parse_date(&self.sale_date)
    }

    /// Scheduled delivery day; `None` while it is still [`DELIVERY_TBD`].
    pub fn delivery_day(&self) -> Option<NaiveDate> {
        parse_date(&self.delivery_date)
    }

    /// Whether this sale belongs to the given executive id or name.
    pub fn assigned_to(&self, executive: &str) -> bool {
        let wanted = executive.trim();
        self.executive_id.as_deref() == Some(wanted)
            || self.executive_name.to_lowercase() == wanted.to_lowercase()
    }
}

// ============================================================================
// Upstream CRM Models
// ============================================================================

/// The `{err, msg, inf}` envelope every CRM endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct CrmEnvelope<T> {
    #[serde(default)]
    pub err: bool,
    #[serde(default)]
    pub msg: String,
    pub inf: Option<T>,
}

impl<T: Default> CrmEnvelope<T> {
    /// Unwrap the payload, turning `err: true` into a business error.
    ///
    /// A missing or null `inf` yields the payload's default (an empty list
    /// for listings).
    pub fn into_inf(self) -> Result<T, CrmError> {
        if self.err {
            let msg = if self.msg.trim().is_empty() {
                "unspecified CRM error".to_string()
            } else {
                self.msg
            };
            return Err(CrmError::UpstreamBusiness(msg));
        }
        Ok(self.inf.unwrap_or_default())
    }
}

/// `inf` payload of `POST /Auth/Login/`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub adm_tok: Option<String>,
}

/// One record of `/Admin/Referido/` as the CRM sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSale {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_id: Option<String>,
    /// Created date.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_fec_cre: Option<String>,
    /// Created time.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_hor_cre: Option<String>,
    /// Scheduled delivery date.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_fec_ent_pro: Option<String>,
    /// Generic scheduled date, fallback for delivery.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_fec_pro: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub usu_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub usu_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub usu_car: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub usu_sub_cat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sup_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tip_pro_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mar_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cli_rut: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cli_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cli_tel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_dir: Option<String>,
    /// Region, HTML-entity encoded.
    #[serde(default, deserialize_with = "lenient_string")]
    pub reg_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub com_nom: Option<String>,
    /// Destination comuna; preferred over `com_nom` for the delivery address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub com_des_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub for_pag_nom: Option<String>,
    /// Final payment amount, string or number.
    #[serde(default)]
    pub ref_pag_fin: Option<Value>,
    /// Final price amount, string or number.
    #[serde(default)]
    pub ref_pre_fin: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ref_num_ped: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub est_nom: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub est_col: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub est_obs: Option<String>,
}

/// Accept any JSON scalar as text; `null`, arrays and objects become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// ============================================================================
// Request Models
// ============================================================================

/// Query string for `GET /ventas`.
#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub ejecutivo_id: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

/// Query string for the windowed metrics endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub cuota_diaria: Option<u32>,
}

// ============================================================================
// Response Models
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub source: String,
}
