use anyhow::Result;
use csvnav::testing::*;
use csvnav::{Lookup, NavConfig, NavError, Navigator};

fn registered(fields: &[&str]) -> Result<(TempFilePath, Navigator)> {
    let file = inventory_file()?;
    let nav = Navigator::open(file.path(), NavConfig::default().with_header(true))?;
    nav.register(fields.iter().copied())?;
    Ok((file, nav))
}

#[test]
fn keys_in_first_appearance_order() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    assert_eq!(nav.fields()?, ["product"]);
    assert_eq!(nav.keys("product")?, ["tire", "sparkplug", "battery"]);
    Ok(())
}

#[test]
fn group_rows_are_in_file_order() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    let tires = nav.by_group("product", "tire")?;
    assert_eq!(tires.row_count(), 3);
    assert_rows_equal(
        tires,
        &[INVENTORY_ROWS[0], INVENTORY_ROWS[3], INVENTORY_ROWS[4]],
    );
    assert_rows_equal(nav.by_group("product", "battery")?, &[INVENTORY_ROWS[2]]);
    Ok(())
}

#[test]
fn group_rows_match_scalar_rows() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    let sparkplugs = collect_rows(nav.by_group("product", "sparkplug")?);
    assert_eq!(sparkplugs, [nav.at(1)?, nav.at(5)?]);
    Ok(())
}

#[test]
fn absent_key_gives_empty_group() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    let none = nav.by_group("product", "wiper")?;
    assert_eq!(none.row_count(), 0);
    assert_eq!(none.count(), 0);
    Ok(())
}

#[test]
fn get_returns_rows_default_or_error() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;

    let hit = nav.get("product", "battery", Some("fallback"))?;
    assert!(!hit.is_default());
    let rows = hit.into_rows().expect("battery is a key");
    assert_rows_equal(rows, &[["2", "battery", "120"]]);

    let miss = nav.get("product", "wiper", Some("fallback"))?;
    assert!(matches!(miss, Lookup::Default("fallback")));

    match nav.get::<()>("product", "wiper", None) {
        Err(NavError::KeyNotFound { field, key }) => {
            assert_eq!(field, "product");
            assert_eq!(key, "wiper");
        }
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn items_pair_every_key_with_its_rows() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    let mut seen = Vec::new();
    for (key, rows) in nav.items("product")? {
        let rows = collect_rows(rows);
        assert!(rows.iter().all(|r| r.get("product") == Some(key.as_str())));
        seen.push((key, rows.len()));
    }
    assert_eq!(
        seen,
        [
            ("tire".to_string(), 3),
            ("sparkplug".to_string(), 2),
            ("battery".to_string(), 1)
        ]
    );
    Ok(())
}

#[test]
fn unregistered_field_is_reported() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    assert!(matches!(
        nav.keys("time"),
        Err(NavError::NotRegistered { field }) if field == "time"
    ));
    assert!(matches!(
        nav.by_group("quantity", "4"),
        Err(NavError::NotRegistered { .. })
    ));
    assert!(matches!(nav.items("time"), Err(NavError::NotRegistered { .. })));
    assert!(matches!(
        nav.get("time", "5", Some(())),
        Err(NavError::NotRegistered { .. })
    ));
    Ok(())
}

#[test]
fn registration_fixes_row_count() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    assert_eq!(nav.size(false)?, Some(6));
    assert_eq!(nav.stats().grouping_scans, 1);
    Ok(())
}

#[test]
fn registration_after_partial_discovery() -> Result<()> {
    let file = inventory_file()?;
    let nav = Navigator::open(file.path(), NavConfig::default().with_header(true))?;
    let before = nav.at(2)?;
    nav.register(["product"])?;
    assert_eq!(nav.at(2)?, before);
    assert_rows_equal(nav.by_group("product", "battery")?, &[INVENTORY_ROWS[2]]);
    Ok(())
}

#[test]
fn registration_is_additive() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    nav.register(["time", "product"])?;
    assert_eq!(nav.fields()?, ["product", "time"]);
    assert_eq!(nav.keys("time")?.len(), 6);
    assert_rows_equal(nav.by_group("time", "30")?, &[INVENTORY_ROWS[5]]);
    assert_eq!(nav.by_group("product", "tire")?.row_count(), 3);
    Ok(())
}

#[test]
fn several_fields_in_one_pass() -> Result<()> {
    let (_file, nav) = registered(&["product", "quantity", "product"])?;
    assert_eq!(nav.fields()?, ["product", "quantity"]);
    assert_eq!(nav.stats().grouping_scans, 1);
    assert_eq!(nav.keys("quantity")?[..2], ["4", "20"]);
    Ok(())
}

#[test]
fn unknown_field_is_invalid() -> Result<()> {
    let file = inventory_file()?;
    let nav = Navigator::open(file.path(), NavConfig::default().with_header(true))?;
    assert!(matches!(
        nav.register(["color"]),
        Err(NavError::InvalidConfiguration(_))
    ));
    assert!(nav.fields()?.is_empty());
    Ok(())
}

#[test]
fn grouping_needs_a_header() -> Result<()> {
    let file = inventory_file()?;
    let nav = Navigator::open(file.path(), NavConfig::default())?;
    assert!(matches!(
        nav.register(["product"]),
        Err(NavError::InvalidConfiguration(_))
    ));

    // a header set after opening is enough
    nav.set_header(["t", "p", "q"])?;
    nav.register(["p"])?;
    assert_eq!(nav.keys("p")?[0], "product");
    Ok(())
}

#[test]
fn grouping_needs_decoded_rows() -> Result<()> {
    let file = inventory_file()?;
    let config = NavConfig::default().with_header(true).with_raw_output(true);
    let nav = Navigator::open(file.path(), config)?;
    assert!(matches!(
        nav.register(["product"]),
        Err(NavError::InvalidConfiguration(_))
    ));
    Ok(())
}

#[test]
fn malformed_row_fails_registration() -> Result<()> {
    let file = mock_text_file("k,v\na,1\nb\n")?;
    let nav = Navigator::open(file.path(), NavConfig::default().with_header(true))?;
    assert!(matches!(
        nav.register(["k"]),
        Err(NavError::RecordShapeMismatch { .. })
    ));
    assert!(matches!(nav.keys("k"), Err(NavError::NotRegistered { .. })));
    Ok(())
}

#[test]
fn close_drops_groups() -> Result<()> {
    let (_file, nav) = registered(&["product"])?;
    nav.close();
    assert!(matches!(nav.keys("product"), Err(NavError::Closed)));
    assert!(matches!(nav.by_group("product", "tire"), Err(NavError::Closed)));
    Ok(())
}

#[test]
fn closed_raw_navigator_reports_closed_on_register() -> Result<()> {
    let file = inventory_file()?;
    let config = NavConfig::default().with_header(true).with_raw_output(true);
    let nav = Navigator::open(file.path(), config)?;
    nav.close();
    assert!(matches!(nav.register(["product"]), Err(NavError::Closed)));
    Ok(())
}
