//! Unit tests for class and property naming

use pretty_assertions::assert_eq;

use rust_daoschema::model::{Column, DataType, SchemaDefinition, Table};
use rust_daoschema::naming::{
    class_name, pluralize, NameCollisionResolver, NameFormatter, NamingCollisionStrategy,
    SchemaNameMap, SchemaNameMapFormatter,
};

#[test]
fn test_class_names() {
    assert_eq!(class_name("order_item"), "OrderItem");
    assert_eq!(class_name("order item"), "OrderItem");
    assert_eq!(class_name("orderItem"), "OrderItem");
    assert_eq!(class_name("2fa codes"), "_2faCodes");
    assert_eq!(class_name("e-mail"), "Email");
    assert_eq!(class_name(""), "");
}

#[test]
fn test_pluralize() {
    assert_eq!(pluralize("Category"), "Categories");
    assert_eq!(pluralize("Day"), "Days");
    assert_eq!(pluralize("Box"), "Boxes");
    assert_eq!(pluralize("Match"), "Matches");
    assert_eq!(pluralize("Post"), "Posts");
}

#[test]
fn test_collision_strategies() {
    let taken = |n: &str| n == "Order";
    let cases = [
        (NamingCollisionStrategy::TypeSuffix, "OrderDao"),
        (NamingCollisionStrategy::TypePrefix, "DaoOrder"),
        (NamingCollisionStrategy::TrailingUnderscore, "Order_"),
        (NamingCollisionStrategy::LeadingUnderscore, "_Order"),
        (NamingCollisionStrategy::UnderscoreDelimit, "Dao_Order"),
    ];
    for (strategy, expected) in cases {
        let resolver = NameCollisionResolver::new(strategy, "Dao");
        assert_eq!(resolver.resolve("Order", taken), expected, "{}", strategy);
        assert_eq!(resolver.resolve("Invoice", taken), "Invoice");
    }
}

#[test]
fn test_repeated_collision_keeps_rewriting() {
    let resolver = NameCollisionResolver::new(NamingCollisionStrategy::TrailingUnderscore, "");
    let taken = |n: &str| n == "Id" || n == "Id_";
    assert_eq!(resolver.resolve("Id", taken), "Id__");
}

#[test]
fn test_strategy_parsing() {
    assert_eq!(
        "trailing-underscore".parse::<NamingCollisionStrategy>().unwrap(),
        NamingCollisionStrategy::TrailingUnderscore
    );
    assert_eq!(
        "TypePrefix".parse::<NamingCollisionStrategy>().unwrap(),
        NamingCollisionStrategy::TypePrefix
    );
    assert!("sideways".parse::<NamingCollisionStrategy>().is_err());
}

#[test]
fn test_name_map_covers_every_table_and_column() {
    let mut schema = SchemaDefinition::new("Shop");
    let mut order = Table::new("order");
    order.add_column(Column::new("id", DataType::ULong));
    order.add_column(Column::new("order", DataType::String));
    schema.add_table(order);
    let mut line = Table::new("order_line");
    line.add_column(Column::new("qty", DataType::Int));
    schema.add_table(line);

    let map = SchemaNameMap::from_schema(&schema, &NameCollisionResolver::default());
    assert_eq!(map.table_names_to_class_names.len(), 2);
    assert_eq!(map.column_names_to_property_names.len(), 3);

    let formatter = SchemaNameMapFormatter::new(map);
    assert_eq!(formatter.format_class_name("order"), "Order");
    assert_eq!(formatter.format_class_name("order_line"), "OrderLine");
    assert_eq!(formatter.format_property_name("order", "id"), "Id");
    // A property never shares its class's name
    assert_eq!(formatter.format_property_name("order", "order"), "OrderDao");
    assert_eq!(formatter.format_property_name("order_line", "qty"), "Qty");
}

#[test]
fn test_name_map_json_shape() {
    let mut map = SchemaNameMap::new();
    map.set_class_name("order_line", "OrderLine");
    map.set_property_name("order_line", "qty", "Quantity");

    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["tableNamesToClassNames"][0]["className"], "OrderLine");
    assert_eq!(json["columnNamesToPropertyNames"][0]["propertyName"], "Quantity");
}
