//! Offline dataset used when no CRM credentials are configured.
//!
//! Records are written in the CRM's raw shape and passed through the same
//! mapper as live data, so the dashboard sees identical field semantics.
//!
//! Sale dates are fixed between 2024-09-02 and 2024-10-07. Routes whose
//! window defaults to "today" (period, trend, projection) therefore report
//! zero sales in fixture mode unless `fecha_inicio`/`fecha_fin` target that
//! range.

use async_trait::async_trait;
use serde_json::Value;

use super::{DataSource, DateWindow};
use crate::error::CrmResult;
use crate::mapper::map_record;
use crate::models::{RawSale, Sale};

pub const FIXTURE_COUNT: usize = 12;

struct Row {
    id: &'static str,
    created: &'static str,
    time: &'static str,
    delivery: Option<&'static str>,
    executive: (&'static str, &'static str, &'static str),
    brand: &'static str,
    customer: (&'static str, &'static str, &'static str),
    address: (&'static str, &'static str, &'static str),
    payment: &'static str,
    amount: u64,
    contract: Option<&'static str>,
    status: (&'static str, &'static str),
}

const CAMILA: (&str, &str, &str) = ("17", "Camila Rojas", "Ejecutiva Senior");
const DIEGO: (&str, &str, &str) = ("23", "Diego Soto", "Ejecutivo Comercial");
const VALENTINA: (&str, &str, &str) = ("31", "Valentina Muñoz", "Ejecutiva Comercial");

const ROWS: [Row; FIXTURE_COUNT] = [
    Row {
        id: "2001",
        created: "2024-09-02",
        time: "10:15:00",
        delivery: Some("2024-10-20"),
        executive: CAMILA,
        brand: "Alerce",
        customer: ("María González", "12.345.678-5", "+56912345678"),
        address: ("Camino Los Robles 455", "San Carlos", "Regi&oacute;n de &Ntilde;uble"),
        payment: "Transferencia",
        amount: 2_750_000,
        contract: Some("C-2024-101"),
        status: ("Entrega OK", "#43a047"),
    },
    Row {
        id: "2002",
        created: "2024-09-03",
        time: "16:40:00",
        delivery: Some("2024-11-05"),
        executive: DIEGO,
        brand: "Roble",
        customer: ("Pedro Araya", "15.987.654-3", "+56987654321"),
        address: ("Parcela 12, Lote B", "Pucón", "Regi&oacute;n de La Araucan&iacute;a"),
        payment: "Crédito hipotecario",
        amount: 4_600_000,
        contract: Some("C-2024-102"),
        status: ("En producción", "#fb8c00"),
    },
    Row {
        id: "2003",
        created: "2024-09-05",
        time: "09:05:00",
        delivery: None,
        executive: VALENTINA,
        brand: "",
        customer: ("Javiera Tapia", "18.222.333-4", "+56955511122"),
        address: ("Los Aromos 123", "Talca", "Regi&oacute;n del Maule"),
        payment: "Contado",
        amount: 1_850_000,
        contract: None,
        status: ("Rechazado por financiamiento", "#e53935"),
    },
    Row {
        id: "2004",
        created: "2024-09-09",
        time: "11:30:00",
        delivery: Some("2024-10-28"),
        executive: CAMILA,
        brand: "Coigüe",
        customer: ("Luis Fernández", "9.876.543-2", "+56944433322"),
        address: ("Av. O&#39;Higgins 1540", "Rancagua", "Regi&oacute;n de O&#39;Higgins"),
        payment: "Transferencia",
        amount: 3_400_000,
        contract: Some("C-2024-103"),
        status: ("Completado", "#2e7d32"),
    },
    Row {
        id: "2005",
        created: "2024-09-12",
        time: "15:20:00",
        delivery: None,
        executive: DIEGO,
        brand: "Alerce",
        customer: ("Francisca Vidal", "17.456.789-0", "+56933322211"),
        address: ("Sector El Manzano s/n", "Villarrica", "Regi&oacute;n de La Araucan&iacute;a"),
        payment: "Crédito de consumo",
        amount: 2_300_000,
        contract: None,
        status: ("En validación", "#fdd835"),
    },
    Row {
        id: "2006",
        created: "2024-09-16",
        time: "12:00:00",
        delivery: Some("2024-11-15"),
        executive: VALENTINA,
        brand: "Roble",
        customer: ("Andrés Castillo", "13.579.246-8", "+56977788899"),
        address: ("Calle Larga 88", "Linares", "Regi&oacute;n del Maule"),
        payment: "Transferencia",
        amount: 5_900_000,
        contract: Some("C-2024-104"),
        status: ("Contrato firmado", "#1e88e5"),
    },
    Row {
        id: "2007",
        created: "2024-09-19",
        time: "17:45:00",
        delivery: None,
        executive: CAMILA,
        brand: "",
        customer: ("Constanza Reyes", "16.111.222-3", "+56966655544"),
        address: ("Pasaje Las Lilas 7", "Chill&aacute;n", "Regi&oacute;n de &Ntilde;uble"),
        payment: "",
        amount: 0,
        contract: None,
        status: ("Pre-ingreso", "#9e9e9e"),
    },
    Row {
        id: "2008",
        created: "2024-09-24",
        time: "10:10:00",
        delivery: Some("2024-11-22"),
        executive: DIEGO,
        brand: "Coigüe",
        customer: ("Rodrigo Pizarro", "11.222.333-4", "+56922233344"),
        address: ("Ruta 5 Sur km 402", "Los &Aacute;ngeles", "Regi&oacute;n del B&iacute;o B&iacute;o"),
        payment: "Crédito hipotecario",
        amount: 3_950_000,
        contract: Some("C-2024-105"),
        status: ("Confirmación de pago", "#8e24aa"),
    },
    Row {
        id: "2009",
        created: "2024-09-27",
        time: "14:25:00",
        delivery: None,
        executive: VALENTINA,
        brand: "Alerce",
        customer: ("Catalina Morales", "19.333.444-5", "+56911122233"),
        address: ("Camino a Cobquecura 220", "Quirihue", "Regi&oacute;n de &Ntilde;uble"),
        payment: "Contado",
        amount: 2_100_000,
        contract: None,
        status: ("Cancelado por cliente", "#e53935"),
    },
    Row {
        id: "2010",
        created: "2024-10-01",
        time: "09:50:00",
        delivery: Some("2024-12-02"),
        executive: CAMILA,
        brand: "Roble",
        customer: ("Ignacio Herrera", "14.555.666-7", "+56988877766"),
        address: ("Los Canelos 301", "Valdivia", "Regi&oacute;n de Los R&iacute;os"),
        payment: "Transferencia",
        amount: 4_250_000,
        contract: Some("C-2024-106"),
        status: ("En fabricación", "#fb8c00"),
    },
    Row {
        id: "2011",
        created: "2024-10-03",
        time: "13:15:00",
        delivery: None,
        executive: DIEGO,
        brand: "",
        customer: ("Daniela Fuentes", "20.123.456-K", "+56999900011"),
        address: ("Villa Los Pinos 45", "Curic&oacute;", "Regi&oacute;n del Maule"),
        payment: "Crédito de consumo",
        amount: 1_650_000,
        contract: None,
        status: ("Pendiente de documentos", "#9e9e9e"),
    },
    Row {
        id: "2012",
        created: "2024-10-07",
        time: "18:05:00",
        delivery: Some("2024-12-10"),
        executive: VALENTINA,
        brand: "Coigüe",
        customer: ("Sebastián Navarro", "10.987.321-6", "+56955544433"),
        address: ("Camino Real 990", "Osorno", "Regi&oacute;n de Los Lagos"),
        payment: "Transferencia",
        amount: 6_300_000,
        contract: Some("C-2024-107"),
        status: ("Contrato firmado", "#1e88e5"),
    },
];

fn text(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

impl Row {
    fn to_raw(&self) -> RawSale {
        let (usu_id, usu_nom, usu_car) = self.executive;
        let (cli_nom, cli_rut, cli_tel) = self.customer;
        let (ref_dir, com_nom, reg_nom) = self.address;
        let (est_nom, est_col) = self.status;
        RawSale {
            ref_id: text(self.id),
            ref_fec_cre: text(self.created),
            ref_hor_cre: text(self.time),
            ref_fec_ent_pro: self.delivery.and_then(text),
            usu_id: text(usu_id),
            usu_nom: text(usu_nom),
            usu_car: text(usu_car),
            sup_nom: text("Jorge Fuentes"),
            tip_pro_nom: text("Casa Prefabricada"),
            mar_nom: text(self.brand),
            cli_rut: text(cli_rut),
            cli_nom: text(cli_nom),
            cli_tel: text(cli_tel),
            ref_dir: text(ref_dir),
            reg_nom: text(reg_nom),
            com_nom: text(com_nom),
            for_pag_nom: text(self.payment),
            ref_pag_fin: Some(Value::from(self.amount)),
            ref_num_ped: self.contract.and_then(text),
            est_nom: text(est_nom),
            est_col: text(est_col),
            ..RawSale::default()
        }
    }
}

/// Fixed sales for running the dashboard without a CRM.
pub struct FixtureSource {
    sales: Vec<Sale>,
}

impl FixtureSource {
    pub fn new() -> Self {
        let mut sales: Vec<Sale> = ROWS.iter().map(|row| map_record(&row.to_raw())).collect();
        sales.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));
        Self { sales }
    }
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    /// The window is ignored: the dataset is returned whole.
    async fn fetch(&self, _window: DateWindow) -> CrmResult<Vec<Sale>> {
        Ok(self.sales.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
