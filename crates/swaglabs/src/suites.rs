//! Scenario bodies for the login, home and cart suites.
//!
//! Every body starts by checking a state marker (URL path or a known
//! element) and fails with an error on the first unmet expectation.

use std::path::PathBuf;

use tracing::info;

use crate::actions::{NavigationStep, Session};
use crate::driver::SessionDriver;
use crate::fixture::SuiteContext;
use crate::locator::names;
use crate::result::{SwagError, SwagResult};
use crate::verify::{verify_order, SortOrder};

/// Error shown when the username is missing
pub const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
/// Error shown when the password is missing
pub const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";
/// Error shown for the locked-out account
pub const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
/// Label of an add button whose product is in the cart
pub const REMOVE_LABEL: &str = "Remove";

/// Hosts the Twitter footer link may land on
pub const TWITTER_HOSTS: &[&str] = &["x.com", "twitter.com"];
/// Hosts the Facebook footer link may land on
pub const FACEBOOK_HOSTS: &[&str] = &["facebook.com"];
/// Hosts the LinkedIn footer link may land on
pub const LINKEDIN_HOSTS: &[&str] = &["linkedin.com"];
/// Hosts the About menu item may land on
pub const ABOUT_HOSTS: &[&str] = &["saucelabs.com"];

// ----------------------------------------------------------------------
// Shared steps
// ----------------------------------------------------------------------

/// Reach the product listing from wherever the session is, logging in as
/// the standard user when the site asks for it
pub async fn ensure_listing<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    if session.on_path("/inventory.html").await? {
        return Ok(());
    }
    let inventory = session.config().url_for("inventory.html");
    let _ = session
        .navigate(&NavigationStep::new().url(inventory))
        .await?;
    if session.is_present(names::LOGIN_BUTTON).await? {
        session.login_standard().await?;
    }
    session.expect_path("/inventory.html").await
}

/// Go back to the listing from the cart or a detail page
async fn return_to_listing<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    if session.on_path("/cart.html").await? {
        let _ = session.follow(names::CONTINUE_SHOPPING).await?;
    } else if session.on_path("/inventory-item.html").await? {
        let _ = session.follow(names::BACK_TO_PRODUCTS).await?;
    }
    session.expect_path("/inventory.html").await
}

async fn expect_login_error<D: SessionDriver>(
    session: &mut Session<D>,
    username: &str,
    password: &str,
    expected: &str,
) -> SwagResult<()> {
    session.expect_present(names::LOGIN_BUTTON).await?;
    session.login(username, password).await?;
    session.expect_present(names::ERROR_MESSAGE).await?;
    session.expect_text(names::ERROR_MESSAGE, expected).await?;
    session.click(names::ERROR_CLOSE_BUTTON).await
}

// ----------------------------------------------------------------------
// Login suite
// ----------------------------------------------------------------------

/// Both fields empty
pub async fn login_empty_fields<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    expect_login_error(session, "", "", USERNAME_REQUIRED).await
}

/// Password only
pub async fn login_empty_username<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    session.refresh().await?;
    let password = session.config().credentials.password.clone();
    expect_login_error(session, "", &password, USERNAME_REQUIRED).await
}

/// Username only
pub async fn login_empty_password<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    session.refresh().await?;
    let user = session.config().credentials.standard_user.clone();
    expect_login_error(session, &user, "", PASSWORD_REQUIRED).await
}

/// Locked-out account
pub async fn login_locked_out<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    session.refresh().await?;
    let user = session.config().credentials.locked_out_user.clone();
    let password = session.config().credentials.password.clone();
    expect_login_error(session, &user, &password, LOCKED_OUT).await
}

/// Standard account reaches the listing
pub async fn login_standard_user<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    session.refresh().await?;
    session.expect_present(names::LOGIN_BUTTON).await?;
    session.login_standard().await?;
    session.expect_path("/inventory.html").await
}

// ----------------------------------------------------------------------
// Home suite
// ----------------------------------------------------------------------

async fn sort_and_verify<D: SessionDriver>(
    session: &mut Session<D>,
    context: &SuiteContext,
    orders: &[SortOrder],
) -> SwagResult<()> {
    return_to_listing(session).await?;
    for &order in orders {
        session.apply_sort(order).await?;
        let observed = session
            .collect_texts(order.column_locator(), context.product_count())
            .await?;
        verify_order(&order.expected(context.snapshot()), &observed)?;
        info!(%order, "listing order verified");
    }
    Ok(())
}

/// Name A to Z, then Z to A
pub async fn sort_by_name<D: SessionDriver>(
    session: &mut Session<D>,
    context: &SuiteContext,
) -> SwagResult<()> {
    sort_and_verify(
        session,
        context,
        &[SortOrder::NameAscending, SortOrder::NameDescending],
    )
    .await
}

/// Price low to high, then high to low
pub async fn sort_by_price<D: SessionDriver>(
    session: &mut Session<D>,
    context: &SuiteContext,
) -> SwagResult<()> {
    sort_and_verify(
        session,
        context,
        &[SortOrder::PriceAscending, SortOrder::PriceDescending],
    )
    .await
}

/// Random add clicks; the badge counts the products showing "Remove"
pub async fn add_products_to_cart<D: SessionDriver>(
    session: &mut Session<D>,
    context: &SuiteContext,
) -> SwagResult<()> {
    return_to_listing(session).await?;
    let count = context.product_count();
    let _ = session.click_randomly(names::ADD_BUTTON, count).await?;
    let labels = session.collect_texts(names::ADD_BUTTON, count).await?;
    let selected = labels.iter().filter(|l| l.as_str() == REMOVE_LABEL).count();

    if selected == 0 {
        let badge = session.cart_badge().await?;
        if !badge.is_absent() {
            return Err(SwagError::assertion(format!(
                "no product selected but the cart badge is {badge:?}"
            )));
        }
        return Ok(());
    }

    let badge = session.wait_for_cart_badge().await?;
    if badge != selected.to_string() {
        return Err(SwagError::assertion(format!(
            "cart badge reads {badge:?}, {selected} products show {REMOVE_LABEL:?}"
        )));
    }
    info!(selected, "cart badge verified");
    Ok(())
}

/// Cart link opens the cart page
pub async fn navigate_to_cart<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    session.follow(names::CART_BUTTON).await?.require()?;
    session.expect_path("/cart.html").await
}

/// A random product's title opens its detail page
pub async fn navigate_to_detail<D: SessionDriver>(
    session: &mut Session<D>,
    context: &SuiteContext,
) -> SwagResult<()> {
    return_to_listing(session).await?;
    let count = context.product_count();
    let index = session.random_index(names::PRODUCT_TITLE_LINK, count)?;
    let listed_name = session.text_nth(names::PRODUCT_NAME, index, count).await?;

    let link = session.nth(names::PRODUCT_TITLE_LINK, index, count)?;
    session
        .navigate(&NavigationStep::new().click(link))
        .await?
        .require()?;
    session.expect_path("/inventory-item.html").await?;
    session.expect_present(names::DETAIL_NAME).await?;
    session.expect_text(names::DETAIL_NAME, &listed_name).await
}

async fn check_external_page<D: SessionDriver>(
    session: &Session<D>,
    hosts: &[&str],
    capture: &str,
) -> SwagResult<PathBuf> {
    session.wait_for_page_ready().await?;
    let url = session.expect_host(hosts).await?;
    info!(%url, "external page reached");
    session.capture_screenshot(capture).await
}

/// Footer link opens a new tab on one of `hosts`; the tab is captured,
/// closed, and focus returns to the listing
pub async fn social_link<D: SessionDriver>(
    session: &mut Session<D>,
    link: &str,
    hosts: &[&str],
    capture: &str,
) -> SwagResult<Option<PathBuf>> {
    return_to_listing(session).await?;
    let _ = session.open_in_new_window(link).await?;
    let checked = check_external_page(session, hosts, capture).await;
    let closed = session.close_secondary_window().await;
    let path = checked?;
    let _ = closed?;
    Ok(Some(path))
}

/// About menu item leaves for the company site; back returns to the listing
pub async fn navigate_to_about<D: SessionDriver>(
    session: &mut Session<D>,
) -> SwagResult<Option<PathBuf>> {
    return_to_listing(session).await?;
    session.open_menu_item(names::ABOUT_LINK).await?;
    let path = check_external_page(session, ABOUT_HOSTS, "About").await?;
    session
        .navigate(&NavigationStep::new().back())
        .await?
        .require()?;
    session.expect_path("/inventory.html").await?;
    Ok(Some(path))
}

/// Reset removes the cart badge element entirely
pub async fn reset_app_state<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    return_to_listing(session).await?;
    session.open_menu_item(names::RESET_LINK).await?;
    let badge = session.cart_badge().await?;
    session.close_menu().await?;
    if badge.is_absent() {
        Ok(())
    } else {
        Err(SwagError::assertion(format!(
            "cart badge still rendered after reset: {badge:?}"
        )))
    }
}

// ----------------------------------------------------------------------
// Cart suite
// ----------------------------------------------------------------------

/// Random add clicks; the cart page lists exactly the products showing
/// "Remove" on the listing
pub async fn cart_lists_selected_products<D: SessionDriver>(
    session: &mut Session<D>,
    context: &SuiteContext,
) -> SwagResult<()> {
    return_to_listing(session).await?;
    session.refresh().await?;
    let count = context.product_count();
    let _ = session.click_randomly(names::ADD_BUTTON, count).await?;

    let labels = session.collect_texts(names::ADD_BUTTON, count).await?;
    let listed = session.collect_texts(names::PRODUCT_NAME, count).await?;
    let mut selected: Vec<String> = labels
        .iter()
        .zip(listed)
        .filter(|(label, _)| label.as_str() == REMOVE_LABEL)
        .map(|(_, name)| name)
        .collect();

    session.follow(names::CART_BUTTON).await?.require()?;
    session.expect_path("/cart.html").await?;
    let in_cart = session.count(names::CART_ITEM_NAME).await?;
    let mut cart = session.collect_texts(names::CART_ITEM_NAME, in_cart).await?;

    selected.sort();
    cart.sort();
    if selected != cart {
        return Err(SwagError::assertion(format!(
            "cart lists {cart:?}, listing selected {selected:?}"
        )));
    }
    info!(items = in_cart, "cart contents verified");
    Ok(())
}

/// Logout returns to the login page
pub async fn logout<D: SessionDriver>(session: &mut Session<D>) -> SwagResult<()> {
    session.logout().await?;
    session.expect_path("/").await?;
    session.expect_present(names::LOGIN_BUTTON).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{SiteConfig, Timing};
    use crate::mock::{Fault, MockStorefront};

    fn session(driver: MockStorefront) -> Session<MockStorefront> {
        let shots = std::env::temp_dir().join("swaglabs-suite-tests");
        Session::new(
            driver,
            SiteConfig::default()
                .with_timing(Timing::instant())
                .with_screenshot_dir(shots)
                .with_seed(11),
        )
    }

    async fn listing(driver: MockStorefront) -> (Session<MockStorefront>, SuiteContext) {
        let mut s = session(driver);
        ensure_listing(&mut s).await.unwrap();
        let context = SuiteContext::capture(&s).await.unwrap();
        (s, context)
    }

    mod login_suite_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_suite_in_order() {
            let mut s = session(MockStorefront::new());
            s.open().await.unwrap();
            login_empty_fields(&mut s).await.unwrap();
            login_empty_username(&mut s).await.unwrap();
            login_empty_password(&mut s).await.unwrap();
            login_locked_out(&mut s).await.unwrap();
            login_standard_user(&mut s).await.unwrap();
            assert!(s.on_path("/inventory.html").await.unwrap());
        }

        #[tokio::test]
        async fn test_wrong_message_fails() {
            let mut s = session(MockStorefront::new());
            s.open().await.unwrap();
            let err = expect_login_error(&mut s, "", "secret_sauce", PASSWORD_REQUIRED)
                .await
                .unwrap_err();
            assert!(err.to_string().contains(USERNAME_REQUIRED));
        }
    }

    mod home_suite_tests {
        use super::*;

        #[tokio::test]
        async fn test_ensure_listing_logs_in() {
            let mut s = session(MockStorefront::new());
            ensure_listing(&mut s).await.unwrap();
            assert!(s.on_path("/inventory.html").await.unwrap());
            assert!(s.driver().was_called("send_keys"));
        }

        #[tokio::test]
        async fn test_sorting_passes() {
            let (mut s, context) = listing(MockStorefront::new()).await;
            sort_by_name(&mut s, &context).await.unwrap();
            sort_by_price(&mut s, &context).await.unwrap();
        }

        #[tokio::test]
        async fn test_broken_sort_reports_first_mismatch() {
            let (mut s, context) = listing(MockStorefront::new().with_fault(Fault::IgnoreSort)).await;
            let err = sort_by_name(&mut s, &context).await.unwrap_err();
            assert!(matches!(err, SwagError::OrderMismatch { index: 0, .. }));
        }

        #[tokio::test]
        async fn test_add_products_badge_matches() {
            for seed in 0..8 {
                let (s, context) = listing(MockStorefront::new()).await;
                let mut s = Session::new(s.into_driver(), s_config(seed));
                add_products_to_cart(&mut s, &context).await.unwrap();
            }
        }

        fn s_config(seed: u64) -> SiteConfig {
            SiteConfig::default()
                .with_timing(Timing::instant())
                .with_seed(seed)
        }

        #[tokio::test]
        async fn test_cart_and_detail_navigation() {
            let (mut s, context) = listing(MockStorefront::new()).await;
            navigate_to_cart(&mut s).await.unwrap();
            navigate_to_detail(&mut s, &context).await.unwrap();
            assert!(s.on_path("/inventory-item.html").await.unwrap());
        }

        #[tokio::test]
        async fn test_social_links_capture_and_return() {
            let tmp = tempfile::tempdir().unwrap();
            let (s, _) = listing(MockStorefront::new()).await;
            let mut s = Session::new(
                s.into_driver(),
                s_config(1).with_screenshot_dir(tmp.path()),
            );
            let shot = social_link(&mut s, names::SOCIAL_TWITTER, TWITTER_HOSTS, "Twitter")
                .await
                .unwrap()
                .unwrap();
            assert!(shot.ends_with("Twitter.png"));
            assert!(shot.exists());
            assert_eq!(s.driver().window_count(), 1);
            assert!(s.on_path("/inventory.html").await.unwrap());
        }

        #[tokio::test]
        async fn test_social_wrong_host_still_closes_tab() {
            let (mut s, _) = listing(MockStorefront::new()).await;
            let err = social_link(&mut s, names::SOCIAL_FACEBOOK, LINKEDIN_HOSTS, "Facebook")
                .await
                .unwrap_err();
            assert!(matches!(err, SwagError::AssertionFailed { .. }));
            assert_eq!(s.driver().window_count(), 1);
            assert!(s.on_path("/inventory.html").await.unwrap());
        }

        #[tokio::test]
        async fn test_about_and_back() {
            let tmp = tempfile::tempdir().unwrap();
            let (s, _) = listing(MockStorefront::new()).await;
            let mut s = Session::new(
                s.into_driver(),
                s_config(1).with_screenshot_dir(tmp.path()),
            );
            let shot = navigate_to_about(&mut s).await.unwrap().unwrap();
            assert!(shot.ends_with("About.png"));
            assert!(s.on_path("/inventory.html").await.unwrap());
        }

        #[tokio::test]
        async fn test_reset_app_state() {
            let (mut s, context) = listing(MockStorefront::new()).await;
            s.click_nth(names::ADD_BUTTON, 1, context.product_count())
                .await
                .unwrap();
            reset_app_state(&mut s).await.unwrap();
            assert!(s.cart_badge().await.unwrap().is_absent());
        }

        #[tokio::test]
        async fn test_reset_with_stale_badge_fails() {
            let (mut s, context) =
                listing(MockStorefront::new().with_fault(Fault::StaleBadgeAfterReset)).await;
            s.click_nth(names::ADD_BUTTON, 1, context.product_count())
                .await
                .unwrap();
            assert!(reset_app_state(&mut s).await.is_err());
        }
    }

    mod cart_suite_tests {
        use super::*;

        #[tokio::test]
        async fn test_cart_lists_selected_then_logout() {
            let (mut s, context) = listing(MockStorefront::new()).await;
            cart_lists_selected_products(&mut s, &context).await.unwrap();
            logout(&mut s).await.unwrap();
            assert!(s.on_path("/").await.unwrap());
        }
    }
}
