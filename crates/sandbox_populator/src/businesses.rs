//! Seed catalog of Botswana small businesses used as counterparty data.
//!
//! A fixed, deterministic set: names act as dedup keys across runs, so the
//! catalog must never change order or spelling once a sandbox has been
//! populated from it.

use obp_client::types::{BespokeField, NewCounterparty};

/// Remote field-length limit on counterparty descriptions
const MAX_DESCRIPTION_LEN: usize = 36;

/// A seed business record
#[derive(Debug, Clone, Copy)]
pub struct Business {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub location: &'static str,
    pub account_number: &'static str,
    pub bank_code: &'static str,
}

const BOTSWANA_BUSINESSES: &[Business] = &[
    Business {
        name: "Mokolodi Crafts",
        description: "Traditional Botswana crafts and artwork",
        category: "Retail - Arts & Crafts",
        location: "Gaborone",
        account_number: "BW0001000001",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Kalahari Safari Tours",
        description: "Wildlife safari and eco-tourism services",
        category: "Tourism",
        location: "Maun",
        account_number: "BW0001000002",
        bank_code: "SBICBWGX",
    },
    Business {
        name: "Botho Fresh Produce",
        description: "Fresh fruits and vegetables supplier",
        category: "Agriculture - Produce",
        location: "Francistown",
        account_number: "BW0001000003",
        bank_code: "BABORWGX",
    },
    Business {
        name: "Tswana Textiles",
        description: "Traditional and modern African textiles",
        category: "Manufacturing - Textiles",
        location: "Gaborone",
        account_number: "BW0001000004",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Okavango Fish Farm",
        description: "Sustainable aquaculture and fish supply",
        category: "Agriculture - Aquaculture",
        location: "Kasane",
        account_number: "BW0001000005",
        bank_code: "SBICBWGX",
    },
    Business {
        name: "Setswana Solar Solutions",
        description: "Solar panel installation and maintenance",
        category: "Energy - Renewable",
        location: "Gaborone",
        account_number: "BW0001000006",
        bank_code: "BABORWGX",
    },
    Business {
        name: "Motswana Mobile Repairs",
        description: "Mobile phone and electronics repair",
        category: "Services - Electronics",
        location: "Lobatse",
        account_number: "BW0001000007",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Chobe Leather Goods",
        description: "Handcrafted leather products and accessories",
        category: "Manufacturing - Leather",
        location: "Kasane",
        account_number: "BW0001000008",
        bank_code: "SBICBWGX",
    },
    Business {
        name: "Gaborone Catering Services",
        description: "Event catering and food services",
        category: "Food & Beverage",
        location: "Gaborone",
        account_number: "BW0001000009",
        bank_code: "BABORWGX",
    },
    Business {
        name: "Pula Construction Materials",
        description: "Building materials and construction supplies",
        category: "Construction",
        location: "Francistown",
        account_number: "BW0001000010",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Tlokweng Transport Services",
        description: "Local freight and logistics services",
        category: "Transport & Logistics",
        location: "Tlokweng",
        account_number: "BW0001000011",
        bank_code: "SBICBWGX",
    },
    Business {
        name: "Botswana Beekeepers Cooperative",
        description: "Honey production and bee products",
        category: "Agriculture - Apiculture",
        location: "Palapye",
        account_number: "BW0001000012",
        bank_code: "BABORWGX",
    },
    Business {
        name: "Maun Auto Mechanics",
        description: "Vehicle repair and maintenance services",
        category: "Automotive Services",
        location: "Maun",
        account_number: "BW0001000013",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Kgalagadi Pottery Studio",
        description: "Handmade pottery and ceramics",
        category: "Arts & Crafts",
        location: "Molepolole",
        account_number: "BW0001000014",
        bank_code: "SBICBWGX",
    },
    Business {
        name: "Delta Digital Services",
        description: "IT support and digital marketing",
        category: "Technology Services",
        location: "Gaborone",
        account_number: "BW0001000015",
        bank_code: "BABORWGX",
    },
    Business {
        name: "Serowe Grain Mills",
        description: "Grain processing and flour production",
        category: "Food Processing",
        location: "Serowe",
        account_number: "BW0001000016",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Nata Salt Mining",
        description: "Natural salt extraction and processing",
        category: "Mining - Salt",
        location: "Nata",
        account_number: "BW0001000017",
        bank_code: "SBICBWGX",
    },
    Business {
        name: "Botswana Beauty Products",
        description: "Natural cosmetics and skincare products",
        category: "Manufacturing - Cosmetics",
        location: "Gaborone",
        account_number: "BW0001000018",
        bank_code: "BABORWGX",
    },
    Business {
        name: "Jwaneng Jewelry Workshop",
        description: "Custom jewelry and diamond polishing",
        category: "Manufacturing - Jewelry",
        location: "Jwaneng",
        account_number: "BW0001000019",
        bank_code: "FNBBBWGX",
    },
    Business {
        name: "Moremi Eco Lodge Supplies",
        description: "Eco-friendly hospitality supplies",
        category: "Hospitality Supplies",
        location: "Maun",
        account_number: "BW0001000020",
        bank_code: "SBICBWGX",
    },
];

/// The first `count` seed businesses, or all of them
pub fn businesses(count: Option<usize>) -> &'static [Business] {
    match count {
        Some(n) => &BOTSWANA_BUSINESSES[..n.min(BOTSWANA_BUSINESSES.len())],
        None => BOTSWANA_BUSINESSES,
    }
}

/// Map a seed business into a counterparty-creation payload. The
/// description is cut to the remote's 36-character field limit; category
/// and location ride along as bespoke attributes.
pub fn counterparty_payload(business: &Business, currency: &str) -> NewCounterparty {
    let description: String = business.description.chars().take(MAX_DESCRIPTION_LEN).collect();
    NewCounterparty {
        name: business.name.to_string(),
        description,
        currency: currency.to_string(),
        other_account_routing_scheme: Some("AccountNumber".to_string()),
        other_account_routing_address: Some(business.account_number.to_string()),
        other_bank_routing_scheme: Some("BIC".to_string()),
        other_bank_routing_address: Some(business.bank_code.to_string()),
        bespoke: Some(vec![
            BespokeField {
                key: "category".to_string(),
                value: business.category.to_string(),
            },
            BespokeField {
                key: "location".to_string(),
                value: business.location.to_string(),
            },
        ]),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let all = businesses(None);
        assert_eq!(all.len(), 20);
        assert_eq!(all[0].name, "Mokolodi Crafts");
        assert_eq!(all[19].name, "Moremi Eco Lodge Supplies");

        // account numbers are unique and sequential
        for (i, business) in all.iter().enumerate() {
            assert_eq!(
                business.account_number,
                format!("BW{:010}", i + 1_000_001),
                "unexpected account number at index {}",
                i
            );
        }
    }

    #[test]
    fn test_businesses_count_clamps() {
        assert_eq!(businesses(Some(10)).len(), 10);
        assert_eq!(businesses(Some(0)).len(), 0);
        assert_eq!(businesses(Some(100)).len(), 20);
        assert_eq!(businesses(Some(10))[9].name, "Pula Construction Materials");
    }

    #[test]
    fn test_payload_mapping() {
        let business = &businesses(None)[0];
        let payload = counterparty_payload(business, "BWP");
        assert_eq!(payload.name, "Mokolodi Crafts");
        assert_eq!(payload.currency, "BWP");
        assert_eq!(
            payload.other_account_routing_scheme.as_deref(),
            Some("AccountNumber")
        );
        assert_eq!(
            payload.other_account_routing_address.as_deref(),
            Some("BW0001000001")
        );
        assert_eq!(payload.other_bank_routing_scheme.as_deref(), Some("BIC"));
        assert_eq!(payload.other_bank_routing_address.as_deref(), Some("FNBBBWGX"));

        let bespoke = payload.bespoke.unwrap();
        assert_eq!(bespoke.len(), 2);
        assert_eq!(bespoke[0].key, "category");
        assert_eq!(bespoke[0].value, "Retail - Arts & Crafts");
        assert_eq!(bespoke[1].key, "location");
        assert_eq!(bespoke[1].value, "Gaborone");
    }

    #[test]
    fn test_description_truncated_to_limit() {
        let long = Business {
            name: "Test",
            description: "An extraordinarily verbose description well past the limit",
            category: "Test",
            location: "Test",
            account_number: "BW0001000099",
            bank_code: "FNBBBWGX",
        };
        let payload = counterparty_payload(&long, "BWP");
        assert_eq!(payload.description.chars().count(), 36);
        assert!(long.description.starts_with(&payload.description));

        // short descriptions pass through untouched
        let short = Business {
            description: "Short",
            ..long
        };
        assert_eq!(counterparty_payload(&short, "BWP").description, "Short");
    }
}
