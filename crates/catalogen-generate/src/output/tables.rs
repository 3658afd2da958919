use catalogen_core::BackendType;

/// Every table the generator writes to.
///
/// Declaration order is the order `flush_all` writes buffers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableId {
    CustomerGroup,
    AttributeSet,
    AttributeGroup,
    EntityAttribute,
    Attribute,
    CatalogAttribute,
    AttributeOption,
    AttributeOptionValue,
    CategoryEntity,
    CategoryValue(BackendType),
    ProductEntity,
    SequenceProduct,
    ProductValue(BackendType),
    CategoryProduct,
    ProductWebsite,
    TierPrice,
    MediaGallery,
    MediaGalleryValue,
    MediaValueToEntity,
    StockItem,
    ProductRelation,
    ProductLink,
    LinkAttributeValue(BackendType),
    SuperAttribute,
    SuperAttributeLabel,
    SuperLink,
    UrlRewrite,
}

impl TableId {
    pub fn name(self) -> &'static str {
        match self {
            TableId::CustomerGroup => "customer_group",
            TableId::AttributeSet => "eav_attribute_set",
            TableId::AttributeGroup => "eav_attribute_group",
            TableId::EntityAttribute => "eav_entity_attribute",
            TableId::Attribute => "eav_attribute",
            TableId::CatalogAttribute => "catalog_eav_attribute",
            TableId::AttributeOption => "eav_attribute_option",
            TableId::AttributeOptionValue => "eav_attribute_option_value",
            TableId::CategoryEntity => "catalog_category_entity",
            TableId::CategoryValue(backend) => match backend {
                BackendType::Static => "catalog_category_entity",
                BackendType::Varchar => "catalog_category_entity_varchar",
                BackendType::Int => "catalog_category_entity_int",
                BackendType::Text => "catalog_category_entity_text",
                BackendType::Decimal => "catalog_category_entity_decimal",
                BackendType::Datetime => "catalog_category_entity_datetime",
            },
            TableId::ProductEntity => "catalog_product_entity",
            TableId::SequenceProduct => "sequence_product",
            TableId::ProductValue(backend) => match backend {
                BackendType::Static => "catalog_product_entity",
                BackendType::Varchar => "catalog_product_entity_varchar",
                BackendType::Int => "catalog_product_entity_int",
                BackendType::Text => "catalog_product_entity_text",
                BackendType::Decimal => "catalog_product_entity_decimal",
                BackendType::Datetime => "catalog_product_entity_datetime",
            },
            TableId::CategoryProduct => "catalog_category_product",
            TableId::ProductWebsite => "catalog_product_website",
            TableId::TierPrice => "catalog_product_entity_tier_price",
            TableId::MediaGallery => "catalog_product_entity_media_gallery",
            TableId::MediaGalleryValue => "catalog_product_entity_media_gallery_value",
            TableId::MediaValueToEntity => "catalog_product_entity_media_gallery_value_to_entity",
            TableId::StockItem => "cataloginventory_stock_item",
            TableId::ProductRelation => "catalog_product_relation",
            TableId::ProductLink => "catalog_product_link",
            TableId::LinkAttributeValue(backend) => match backend {
                BackendType::Int => "catalog_product_link_attribute_int",
                BackendType::Decimal => "catalog_product_link_attribute_decimal",
                _ => "catalog_product_link_attribute_varchar",
            },
            TableId::SuperAttribute => "catalog_product_super_attribute",
            TableId::SuperAttributeLabel => "catalog_product_super_attribute_label",
            TableId::SuperLink => "catalog_product_super_link",
            TableId::UrlRewrite => "url_rewrite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_tables_follow_backend_type() {
        assert_eq!(
            TableId::ProductValue(BackendType::Decimal).name(),
            "catalog_product_entity_decimal"
        );
        assert_eq!(
            TableId::CategoryValue(BackendType::Int).name(),
            "catalog_category_entity_int"
        );
        assert_eq!(
            TableId::LinkAttributeValue(BackendType::Int).name(),
            "catalog_product_link_attribute_int"
        );
    }

    #[test]
    fn entity_tables_flush_before_their_values() {
        assert!(TableId::CategoryEntity < TableId::CategoryValue(BackendType::Varchar));
        assert!(TableId::ProductEntity < TableId::ProductValue(BackendType::Int));
        assert!(TableId::ProductLink < TableId::LinkAttributeValue(BackendType::Decimal));
        assert!(TableId::SuperLink < TableId::UrlRewrite);
    }
}
