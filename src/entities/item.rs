use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed subcategory vocabulary for finished goods. Raw materials carry
/// free-form subcategories.
pub const FINISHED_GOOD_SUBCATEGORIES: [&str; 7] = [
    "appetizer",
    "main_course",
    "side",
    "dessert",
    "beverage",
    "bakery",
    "combo",
];

/// Item entity: one row per (location, code) pair
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Item)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub location_id: Uuid,
    /// Unique within a location; immutable once assigned
    pub code: String,
    /// Stable identifier from the external catalog, preferred for matching
    pub external_id: Option<String>,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub kind: ItemKind,
    pub unit: UnitOfMeasure,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
    pub current_stock: Decimal,
    pub minimum_stock: Decimal,
    pub maximum_stock: Decimal,
    pub reorder_point: Decimal,
    /// Denormalized current_stock * unit_price, recomputed on every write
    pub total_value: Decimal,
    pub catalog_status: CatalogStatus,
    pub stock_status: StockStatus,
    pub is_active: bool,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if active_model.id.is_not_set() {
                active_model.id = Set(Uuid::new_v4());
            }
            if active_model.created_at.is_not_set() {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}

/// Catalog lifecycle state, independent of stock levels
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CatalogStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "discontinued")]
    Discontinued,
}

/// Stock level classification derived from current stock and thresholds
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    #[sea_orm(string_value = "in_stock")]
    InStock,
    #[sea_orm(string_value = "low_stock")]
    LowStock,
    #[sea_orm(string_value = "out_of_stock")]
    OutOfStock,
    #[sea_orm(string_value = "overstock")]
    Overstock,
}

impl StockStatus {
    /// Derives the stock status from current levels. Rules are evaluated in
    /// priority order; the first match wins. A zero maximum means no ceiling
    /// is configured and never classifies as overstock.
    pub fn from_levels(
        current_stock: Decimal,
        reorder_point: Decimal,
        maximum_stock: Decimal,
    ) -> Self {
        if current_stock <= Decimal::ZERO {
            StockStatus::OutOfStock
        } else if current_stock <= reorder_point {
            StockStatus::LowStock
        } else if maximum_stock > Decimal::ZERO && current_stock >= maximum_stock {
            StockStatus::Overstock
        } else {
            StockStatus::InStock
        }
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    #[sea_orm(string_value = "raw_material")]
    RawMaterial,
    #[sea_orm(string_value = "finished_good")]
    FinishedGood,
}

/// Unit of measure vocabulary
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnitOfMeasure {
    #[sea_orm(string_value = "piece")]
    Piece,
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "ltr")]
    Ltr,
    #[sea_orm(string_value = "ml")]
    Ml,
    #[sea_orm(string_value = "g")]
    G,
    #[sea_orm(string_value = "box")]
    Box,
    #[sea_orm(string_value = "pack")]
    Pack,
    #[sea_orm(string_value = "serving")]
    Serving,
}

impl UnitOfMeasure {
    /// Case-insensitive synonym table for unit strings as they arrive from
    /// external catalogs and import rows. Returns None for unknown units so
    /// callers can apply their configured fallback.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "piece" | "pieces" | "pc" | "pcs" | "unit" | "units" | "ea" | "each" | "nos" => {
                Some(UnitOfMeasure::Piece)
            }
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(UnitOfMeasure::Kg),
            "ltr" | "l" | "lt" | "litre" | "liter" | "litres" | "liters" => {
                Some(UnitOfMeasure::Ltr)
            }
            "ml" | "millilitre" | "milliliter" | "millilitres" | "milliliters" => {
                Some(UnitOfMeasure::Ml)
            }
            "g" | "gm" | "gms" | "gram" | "grams" => Some(UnitOfMeasure::G),
            "box" | "boxes" | "bx" | "carton" | "cartons" | "ctn" => Some(UnitOfMeasure::Box),
            "pack" | "packs" | "packet" | "packets" | "pkt" | "pkts" => Some(UnitOfMeasure::Pack),
            "serving" | "servings" | "portion" | "portions" | "plate" | "plates" => {
                Some(UnitOfMeasure::Serving)
            }
            _ => None,
        }
    }
}

/// Returns true when the subcategory is acceptable for the given kind.
/// Finished goods draw from the closed list; raw materials are free-form.
pub fn subcategory_is_valid(kind: ItemKind, sub_category: Option<&str>) -> bool {
    match (kind, sub_category) {
        (ItemKind::FinishedGood, Some(sub)) => {
            FINISHED_GOOD_SUBCATEGORIES.contains(&sub.trim().to_lowercase().as_str())
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn stock_status_priority_order() {
        // out-of-stock beats everything
        assert_eq!(
            StockStatus::from_levels(dec!(0), dec!(5), dec!(100)),
            StockStatus::OutOfStock
        );
        assert_eq!(
            StockStatus::from_levels(dec!(-3), dec!(5), dec!(100)),
            StockStatus::OutOfStock
        );
        // boundary is inclusive for low stock
        assert_eq!(
            StockStatus::from_levels(dec!(5), dec!(5), dec!(100)),
            StockStatus::LowStock
        );
        assert_eq!(
            StockStatus::from_levels(dec!(100), dec!(5), dec!(100)),
            StockStatus::Overstock
        );
        assert_eq!(
            StockStatus::from_levels(dec!(50), dec!(5), dec!(100)),
            StockStatus::InStock
        );
        // an unset (zero) maximum never reads as overstock
        assert_eq!(
            StockStatus::from_levels(dec!(50), dec!(5), dec!(0)),
            StockStatus::InStock
        );
    }

    proptest! {
        #[test]
        fn stock_status_is_total_and_exclusive(
            current in -1_000i64..1_000,
            reorder in 0i64..1_000,
            maximum in 0i64..1_000,
        ) {
            let current = Decimal::from(current);
            let reorder = Decimal::from(reorder);
            let maximum = Decimal::from(maximum);
            let status = StockStatus::from_levels(current, reorder, maximum);

            // every input classifies, and the classification implies its rule
            match status {
                StockStatus::OutOfStock => prop_assert!(current <= Decimal::ZERO),
                StockStatus::LowStock => {
                    prop_assert!(current > Decimal::ZERO && current <= reorder)
                }
                StockStatus::Overstock => {
                    prop_assert!(
                        current > Decimal::ZERO
                            && current > reorder
                            && maximum > Decimal::ZERO
                            && current >= maximum
                    )
                }
                StockStatus::InStock => {
                    prop_assert!(current > Decimal::ZERO && current > reorder);
                    prop_assert!(maximum <= Decimal::ZERO || current < maximum);
                }
            }
        }
    }

    #[test]
    fn unit_synonyms_normalize() {
        assert_eq!(UnitOfMeasure::parse("KGS"), Some(UnitOfMeasure::Kg));
        assert_eq!(UnitOfMeasure::parse("kilogram"), Some(UnitOfMeasure::Kg));
        assert_eq!(UnitOfMeasure::parse(" Litre "), Some(UnitOfMeasure::Ltr));
        assert_eq!(UnitOfMeasure::parse("pcs"), Some(UnitOfMeasure::Piece));
        assert_eq!(UnitOfMeasure::parse("EA"), Some(UnitOfMeasure::Piece));
        assert_eq!(UnitOfMeasure::parse("gm"), Some(UnitOfMeasure::G));
        assert_eq!(UnitOfMeasure::parse("portions"), Some(UnitOfMeasure::Serving));
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert_eq!(UnitOfMeasure::parse("hogshead"), None);
        assert_eq!(UnitOfMeasure::parse(""), None);
        assert_eq!(UnitOfMeasure::parse("   "), None);
    }

    #[test]
    fn canonical_unit_strings_round_trip() {
        for unit in [
            UnitOfMeasure::Piece,
            UnitOfMeasure::Kg,
            UnitOfMeasure::Ltr,
            UnitOfMeasure::Ml,
            UnitOfMeasure::G,
            UnitOfMeasure::Box,
            UnitOfMeasure::Pack,
            UnitOfMeasure::Serving,
        ] {
            assert_eq!(UnitOfMeasure::parse(&unit.to_string()), Some(unit));
        }
    }

    #[test]
    fn finished_good_subcategories_are_closed() {
        assert!(subcategory_is_valid(
            ItemKind::FinishedGood,
            Some("main_course")
        ));
        assert!(subcategory_is_valid(ItemKind::FinishedGood, Some("Dessert")));
        assert!(!subcategory_is_valid(
            ItemKind::FinishedGood,
            Some("midnight_snack")
        ));
        assert!(subcategory_is_valid(ItemKind::FinishedGood, None));
        assert!(subcategory_is_valid(
            ItemKind::RawMaterial,
            Some("anything_goes")
        ));
    }
}
