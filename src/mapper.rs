//! # Record Mapper
//!
//! Turns one loosely-typed [`RawSale`] into one [`Sale`]. Pure: no I/O, no
//! clock. Every optional upstream field resolves to a concrete value here so
//! nothing downstream ever sees a missing field.
//!
//! ## Fallback chains
//!
//! - amount: final payment (`ref_pag_fin`), then final price (`ref_pre_fin`), then 0
//! - delivery date: `ref_fec_ent_pro`, then `ref_fec_pro`, then [`DELIVERY_TBD`]
//! - comuna: destination comuna, then registration comuna
//! - model brand: brand, then product type, then `"Casa"`

use crate::entities::decode_html_entities;
use crate::models::{Address, RawSale, Sale, DELIVERY_TBD, NO_CONTRACT};
use crate::numeric::parse_amount;

pub const DEFAULT_ROLE: &str = "Vendedor";
pub const DEFAULT_EXECUTIVE: &str = "Sin asignar";
pub const DEFAULT_SUPERVISOR: &str = "Sin supervisor";
pub const DEFAULT_STATUS: &str = "Sin estado";
pub const DEFAULT_OBSERVATIONS: &str = "Sin observaciones";
pub const DEFAULT_CUSTOMER: &str = "Sin nombre";
pub const DEFAULT_BRAND: &str = "Casa";
pub const DEFAULT_PAYMENT_METHOD: &str = "Sin información";

/// Upper bounds (inclusive, CLP) of each house size bucket, ascending.
const SIZE_BUCKETS: &[(u64, &str)] = &[
    (2_000_000, "36 m²"),
    (3_000_000, "54 m²"),
    (4_000_000, "72 m²"),
    (5_000_000, "90 m²"),
];
const LARGEST_BUCKET: &str = "120 m²";

/// Map one raw CRM record into the domain model.
pub fn map_record(raw: &RawSale) -> Sale {
    let amount = resolve_amount(raw);
    let brand = first_present(&[&raw.mar_nom, &raw.tip_pro_nom]).unwrap_or(DEFAULT_BRAND);

    let executive_name = text_or(&raw.usu_nom, DEFAULT_EXECUTIVE);
    let executive_role = text_or(&raw.usu_car, DEFAULT_ROLE);
    let executive = format!("{} ({})", executive_name, executive_role);

    Sale {
        id: text_or(&raw.ref_id, ""),
        customer_name: text_or(&raw.cli_nom, DEFAULT_CUSTOMER),
        customer_rut: text_or(&raw.cli_rut, ""),
        customer_phone: text_or(&raw.cli_tel, ""),
        address: Address {
            street: decode_html_entities(&text_or(&raw.ref_dir, "")),
            comuna: decode_html_entities(
                first_present(&[&raw.com_des_nom, &raw.com_nom]).unwrap_or(""),
            ),
            region: decode_html_entities(&text_or(&raw.reg_nom, "")),
        },
        amount,
        model: format!("{} {}", brand, size_bucket(amount)),
        product_type: text_or(&raw.tip_pro_nom, ""),
        payment_method: text_or(&raw.for_pag_nom, DEFAULT_PAYMENT_METHOD),
        sale_date: resolve_sale_date(raw),
        delivery_date: first_present(&[&raw.ref_fec_ent_pro, &raw.ref_fec_pro])
            .unwrap_or(DELIVERY_TBD)
            .to_string(),
        executive_id: present(&raw.usu_id).map(str::to_string),
        executive_name,
        executive_role,
        executive,
        executive_subcategory: text_or(&raw.usu_sub_cat, ""),
        supervisor: text_or(&raw.sup_nom, DEFAULT_SUPERVISOR),
        status: text_or(&raw.est_nom, DEFAULT_STATUS),
        status_color: text_or(&raw.est_col, ""),
        observations: text_or(&raw.est_obs, DEFAULT_OBSERVATIONS),
        contract_number: text_or(&raw.ref_num_ped, NO_CONTRACT),
    }
}

/// Map a whole listing page.
pub fn map_records(raw: &[RawSale]) -> Vec<Sale> {
    raw.iter().map(map_record).collect()
}

/// Final payment when it is a positive amount, otherwise the final price.
pub fn resolve_amount(raw: &RawSale) -> u64 {
    match parse_amount(raw.ref_pag_fin.as_ref()) {
        0 => parse_amount(raw.ref_pre_fin.as_ref()),
        paid => paid,
    }
}

/// Display bucket for a resolved amount.
pub fn size_bucket(amount: u64) -> &'static str {
    SIZE_BUCKETS
        .iter()
        .find(|(limit, _)| amount <= *limit)
        .map(|(_, label)| *label)
        .unwrap_or(LARGEST_BUCKET)
}

fn resolve_sale_date(raw: &RawSale) -> String {
    let date = raw.ref_fec_cre.as_deref().unwrap_or("");
    let time = raw.ref_hor_cre.as_deref().unwrap_or("");
    format!("{} {}", date.trim(), time.trim()).trim().to_string()
}

/// Trimmed field value, treating empty strings as absent.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn first_present<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields.iter().find_map(|field| present(*field))
}

fn text_or(field: &Option<String>, default: &str) -> String {
    present(field).unwrap_or(default).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw_from(value: Value) -> RawSale {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_golden_record() {
        let raw = raw_from(json!({
            "ref_id": "1042",
            "ref_fec_cre": "2024-09-03",
            "ref_hor_cre": "16:45:10",
            "ref_fec_ent_pro": "2024-10-15",
            "ref_fec_pro": "2024-10-30",
            "usu_id": 17,
            "usu_nom": "Camila Rojas",
            "usu_car": "Ejecutiva Senior",
            "usu_sub_cat": "Terreno",
            "sup_nom": "Jorge Fuentes",
            "tip_pro_nom": "Casa Prefabricada",
            "mar_nom": "Alerce",
            "cli_rut": "12.345.678-5",
            "cli_nom": "María González",
            "cli_tel": "+56912345678",
            "ref_dir": "Camino Los Robles 455",
            "reg_nom": "Regi&oacute;n de &Ntilde;uble",
            "com_nom": "Chill&aacute;n",
            "com_des_nom": "San Carlos",
            "for_pag_nom": "Transferencia",
            "ref_pag_fin": "2750000",
            "ref_pre_fin": 2900000,
            "ref_num_ped": "C-2024-118",
            "est_nom": "Contrato firmado",
            "est_col": "#1e88e5",
            "est_obs": "Cliente solicita entrega temprano"
        }));

        let expected = Sale {
            id: "1042".into(),
            customer_name: "María González".into(),
            customer_rut: "12.345.678-5".into(),
            customer_phone: "+56912345678".into(),
            address: Address {
                street: "Camino Los Robles 455".into(),
                comuna: "San Carlos".into(),
                region: "Región de Ñuble".into(),
            },
            amount: 2_750_000,
            model: "Alerce 54 m²".into(),
            product_type: "Casa Prefabricada".into(),
            payment_method: "Transferencia".into(),
            sale_date: "2024-09-03 16:45:10".into(),
            delivery_date: "2024-10-15".into(),
            executive_id: Some("17".into()),
            executive_name: "Camila Rojas".into(),
            executive_role: "Ejecutiva Senior".into(),
            executive: "Camila Rojas (Ejecutiva Senior)".into(),
            executive_subcategory: "Terreno".into(),
            supervisor: "Jorge Fuentes".into(),
            status: "Contrato firmado".into(),
            status_color: "#1e88e5".into(),
            observations: "Cliente solicita entrega temprano".into(),
            contract_number: "C-2024-118".into(),
        };

        assert_eq!(map_record(&raw), expected);
    }

    #[test]
    fn test_empty_record_gets_every_default() {
        let sale = map_record(&RawSale::default());

        assert_eq!(sale.amount, 0);
        assert_eq!(sale.model, "Casa 36 m²");
        assert_eq!(sale.sale_date, "");
        assert_eq!(sale.delivery_date, DELIVERY_TBD);
        assert_eq!(sale.executive, "Sin asignar (Vendedor)");
        assert_eq!(sale.executive_id, None);
        assert_eq!(sale.supervisor, DEFAULT_SUPERVISOR);
        assert_eq!(sale.status, DEFAULT_STATUS);
        assert_eq!(sale.observations, DEFAULT_OBSERVATIONS);
        assert_eq!(sale.contract_number, NO_CONTRACT);
        assert_eq!(sale.customer_name, DEFAULT_CUSTOMER);
        assert_eq!(sale.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(sale.address.full(), "");
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let raw = raw_from(json!({
            "ref_fec_cre": "2024-09-01",
            "ref_hor_cre": "   ",
            "ref_fec_ent_pro": "",
            "ref_fec_pro": "2024-11-20",
            "usu_car": "",
            "est_nom": "  ",
            "ref_num_ped": "",
            "com_des_nom": "",
            "com_nom": "Talca"
        }));
        let sale = map_record(&raw);

        assert_eq!(sale.sale_date, "2024-09-01");
        assert_eq!(sale.delivery_date, "2024-11-20");
        assert_eq!(sale.executive_role, DEFAULT_ROLE);
        assert_eq!(sale.status, DEFAULT_STATUS);
        assert_eq!(sale.contract_number, NO_CONTRACT);
        assert_eq!(sale.address.comuna, "Talca");
    }

    #[test]
    fn test_amount_falls_back_to_final_price() {
        let cases = [
            (json!({"ref_pag_fin": null, "ref_pre_fin": "3500000"}), 3_500_000),
            (json!({"ref_pag_fin": "", "ref_pre_fin": 4200000}), 4_200_000),
            (json!({"ref_pag_fin": "n/a", "ref_pre_fin": "n/a"}), 0),
            (json!({"ref_pag_fin": 0, "ref_pre_fin": 1900000}), 1_900_000),
            (json!({"ref_pag_fin": 5100000, "ref_pre_fin": 1}), 5_100_000),
        ];
        for (value, expected) in cases {
            assert_eq!(resolve_amount(&raw_from(value.clone())), expected, "{}", value);
        }
    }

    #[test]
    fn test_amount_is_never_negative_for_hostile_inputs() {
        let hostile = [
            json!(null),
            json!(""),
            json!("-1"),
            json!(-2500000),
            json!(-0.01),
            json!("NaN"),
            json!("Infinity"),
            json!(true),
            json!({}),
            json!([]),
            json!("   "),
            json!("1e9"),
        ];
        for pay in &hostile {
            for price in &hostile {
                let raw = raw_from(json!({"ref_pag_fin": pay, "ref_pre_fin": price}));
                let sale = map_record(&raw);
                assert!(
                    sale.amount <= 1,
                    "pay={} price={} gave {}",
                    pay,
                    price,
                    sale.amount
                );
            }
        }
    }

    #[test]
    fn test_size_bucket_thresholds() {
        assert_eq!(size_bucket(0), "36 m²");
        assert_eq!(size_bucket(2_000_000), "36 m²");
        assert_eq!(size_bucket(2_000_001), "54 m²");
        assert_eq!(size_bucket(3_000_000), "54 m²");
        assert_eq!(size_bucket(4_000_000), "72 m²");
        assert_eq!(size_bucket(5_000_000), "90 m²");
        assert_eq!(size_bucket(5_000_001), "120 m²");
        assert_eq!(size_bucket(95_000_000), "120 m²");
    }

    #[test]
    fn test_model_brand_falls_back_to_product_type() {
        let raw = raw_from(json!({"tip_pro_nom": "Cabaña", "ref_pre_fin": "4800000"}));
        assert_eq!(map_record(&raw).model, "Cabaña 90 m²");
    }

    #[test]
    fn test_region_is_entity_decoded() {
        let raw = raw_from(json!({
            "ref_dir": "Pasaje O&#39;Higgins 12",
            "com_nom": "Valpara&iacute;so",
            "reg_nom": "5&ordf; Regi&oacute;n de Valpara&iacute;so"
        }));
        let sale = map_record(&raw);
        assert_eq!(
            sale.address.full(),
            "Pasaje O'Higgins 12, Valparaíso, 5ª Región de Valparaíso"
        );
    }
}
