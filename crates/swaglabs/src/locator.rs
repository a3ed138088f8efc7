//! Locator registry: semantic element names mapped to selectors.
//!
//! Every element the suites touch is named here once. Repeated elements
//! (product rows, add buttons, cart lines) are registered as *indexed*
//! locators and resolved per position with a 1-based index, so a scenario
//! never hard-codes how many products the page renders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::{SwagError, SwagResult};

/// Well-known locator names
pub mod names {
    /// Username input on the login page
    pub const USER_NAME_FIELD: &str = "user_name_field";
    /// Password input on the login page
    pub const PASSWORD_FIELD: &str = "password_field";
    /// Login submit button
    pub const LOGIN_BUTTON: &str = "login_button";
    /// Login error banner
    pub const ERROR_MESSAGE: &str = "error_message";
    /// Close button inside the login error banner
    pub const ERROR_CLOSE_BUTTON: &str = "error_close_button";

    /// Burger menu toggle
    pub const MENU_BUTTON: &str = "menu_button";
    /// Burger menu close button
    pub const MENU_CLOSE_BUTTON: &str = "menu_close_button";
    /// Sidebar logout link
    pub const LOGOUT_LINK: &str = "logout_link";
    /// Sidebar about link
    pub const ABOUT_LINK: &str = "about_link";
    /// Sidebar reset-app-state link
    pub const RESET_LINK: &str = "reset_link";

    /// Product sort dropdown
    pub const SORT_SELECT: &str = "sort_select";
    /// Sort option: name A to Z
    pub const SORT_NAME_ASC: &str = "sort_name_asc";
    /// Sort option: name Z to A
    pub const SORT_NAME_DESC: &str = "sort_name_desc";
    /// Sort option: price low to high
    pub const SORT_PRICE_ASC: &str = "sort_price_asc";
    /// Sort option: price high to low
    pub const SORT_PRICE_DESC: &str = "sort_price_desc";

    /// Product card (indexed)
    pub const PRODUCT_CARD: &str = "product_card";
    /// Product name cell (indexed)
    pub const PRODUCT_NAME: &str = "product_name";
    /// Product price cell (indexed)
    pub const PRODUCT_PRICE: &str = "product_price";
    /// Add/remove cart button on a product card (indexed)
    pub const ADD_BUTTON: &str = "add_button";
    /// Title link on a product card (indexed)
    pub const PRODUCT_TITLE_LINK: &str = "product_title_link";

    /// Shopping cart badge
    pub const CART_BADGE: &str = "cart_badge";
    /// Shopping cart link
    pub const CART_BUTTON: &str = "cart_button";

    /// Footer Twitter link
    pub const SOCIAL_TWITTER: &str = "social_twitter";
    /// Footer Facebook link
    pub const SOCIAL_FACEBOOK: &str = "social_facebook";
    /// Footer LinkedIn link
    pub const SOCIAL_LINKEDIN: &str = "social_linkedin";

    /// Product name on the detail page
    pub const DETAIL_NAME: &str = "detail_name";
    /// Back-to-products button on the detail page
    pub const BACK_TO_PRODUCTS: &str = "back_to_products";

    /// Continue-shopping button on the cart page
    pub const CONTINUE_SHOPPING: &str = "continue_shopping";
    /// Item name on the cart page (indexed)
    pub const CART_ITEM_NAME: &str = "cart_item_name";
}

/// Selector expression for locating an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Element id attribute
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// The raw selector text
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(s) | Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// JavaScript expression evaluating to the first matching element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Id(id) => format!("document.getElementById({id:?})"),
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => format!(
                "document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
            ),
        }
    }

    /// JavaScript expression evaluating to the number of matching elements
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self {
            Self::Id(id) => format!("(document.getElementById({id:?}) ? 1 : 0)"),
            Self::Css(s) => format!("document.querySelectorAll({s:?}).length"),
            Self::XPath(s) => format!(
                "document.evaluate({s:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength"
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(s) => write!(f, "id={s}"),
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// How a named locator resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorDef {
    /// A single element
    Static(Selector),
    /// A repeated element addressed by 1-based position; `base` is an XPath
    /// matching all occurrences
    Indexed {
        /// XPath matching every occurrence
        base: String,
    },
}

impl LocatorDef {
    /// Whether this locator takes an index
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }
}

/// A selector recognised as one of the registered locators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorMatch<'a> {
    /// Locator name
    pub name: &'a str,
    /// 1-based position for indexed locators
    pub index: Option<usize>,
}

/// Immutable name-to-selector mapping
#[derive(Debug, Clone, Default)]
pub struct LocatorRegistry {
    entries: BTreeMap<String, LocatorDef>,
}

impl LocatorRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single-element locator
    #[must_use]
    pub fn with_static(mut self, name: impl Into<String>, selector: Selector) -> Self {
        let _ = self
            .entries
            .insert(name.into(), LocatorDef::Static(selector));
        self
    }

    /// Register a repeated-element locator
    #[must_use]
    pub fn with_indexed(mut self, name: impl Into<String>, base_xpath: impl Into<String>) -> Self {
        let _ = self.entries.insert(
            name.into(),
            LocatorDef::Indexed {
                base: base_xpath.into(),
            },
        );
        self
    }

    /// The storefront's locators
    #[must_use]
    pub fn storefront() -> Self {
        use names::*;

        Self::new()
            // Login page
            .with_static(USER_NAME_FIELD, Selector::id("user-name"))
            .with_static(PASSWORD_FIELD, Selector::id("password"))
            .with_static(LOGIN_BUTTON, Selector::id("login-button"))
            .with_static(ERROR_MESSAGE, Selector::xpath(r#"//h3[@data-test="error"]"#))
            .with_static(
                ERROR_CLOSE_BUTTON,
                Selector::xpath(r#"//h3[@data-test="error"]/button"#),
            )
            // Header and sidebar
            .with_static(MENU_BUTTON, Selector::id("react-burger-menu-btn"))
            .with_static(MENU_CLOSE_BUTTON, Selector::id("react-burger-cross-btn"))
            .with_static(LOGOUT_LINK, Selector::id("logout_sidebar_link"))
            .with_static(
                ABOUT_LINK,
                Selector::xpath(r#"//a[@data-test="about-sidebar-link"]"#),
            )
            .with_static(
                RESET_LINK,
                Selector::xpath(r#"//a[@data-test="reset-sidebar-link"]"#),
            )
            .with_static(
                SORT_SELECT,
                Selector::xpath(r#"//*[@id="header_container"]/div[2]/div/span/select"#),
            )
            .with_static(
                SORT_NAME_ASC,
                Selector::xpath(r#"//*[@id="header_container"]/div[2]/div/span/select/option[1]"#),
            )
            .with_static(
                SORT_NAME_DESC,
                Selector::xpath(r#"//*[@id="header_container"]/div[2]/div/span/select/option[2]"#),
            )
            .with_static(
                SORT_PRICE_ASC,
                Selector::xpath(r#"//*[@id="header_container"]/div[2]/div/span/select/option[3]"#),
            )
            .with_static(
                SORT_PRICE_DESC,
                Selector::xpath(r#"//*[@id="header_container"]/div[2]/div/span/select/option[4]"#),
            )
            .with_static(
                CART_BADGE,
                Selector::xpath(r#"//*[@id="shopping_cart_container"]/a/span"#),
            )
            .with_static(
                CART_BUTTON,
                Selector::xpath(r#"//*[@id="shopping_cart_container"]"#),
            )
            // Inventory listing
            .with_indexed(
                PRODUCT_CARD,
                r#"//div[@data-test="inventory-item-description"]"#,
            )
            .with_indexed(PRODUCT_NAME, r#"//div[@data-test="inventory-item-name"]"#)
            .with_indexed(PRODUCT_PRICE, r#"//div[@data-test="inventory-item-price"]"#)
            .with_indexed(
                ADD_BUTTON,
                r#"//div[@data-test="inventory-item-description"]/div[2]/button"#,
            )
            .with_indexed(
                PRODUCT_TITLE_LINK,
                r#"//div[@data-test="inventory-item-description"]//a[contains(@data-test, "title-link")]"#,
            )
            // Footer
            .with_static(
                SOCIAL_TWITTER,
                Selector::xpath(r#"//a[@data-test="social-twitter"]"#),
            )
            .with_static(
                SOCIAL_FACEBOOK,
                Selector::xpath(r#"//a[@data-test="social-facebook"]"#),
            )
            .with_static(
                SOCIAL_LINKEDIN,
                Selector::xpath(r#"//a[@data-test="social-linkedin"]"#),
            )
            // Detail page
            .with_static(
                DETAIL_NAME,
                Selector::xpath(r#"//div[contains(@class, "inventory_details_name")]"#),
            )
            .with_static(
                BACK_TO_PRODUCTS,
                Selector::xpath(r#"//button[@data-test="back-to-products"]"#),
            )
            // Cart page
            .with_static(
                CONTINUE_SHOPPING,
                Selector::xpath(r#"//button[@data-test="continue-shopping"]"#),
            )
            .with_indexed(
                CART_ITEM_NAME,
                r#"//div[@class="cart_item"]//div[@data-test="inventory-item-name"]"#,
            )
    }

    fn def(&self, name: &str) -> SwagResult<&LocatorDef> {
        self.entries
            .get(name)
            .ok_or_else(|| SwagError::UnknownLocator {
                name: name.to_string(),
            })
    }

    /// Resolve a single-element locator
    pub fn resolve(&self, name: &str) -> SwagResult<Selector> {
        match self.def(name)? {
            LocatorDef::Static(selector) => Ok(selector.clone()),
            LocatorDef::Indexed { .. } => Err(SwagError::LocatorArity {
                name: name.to_string(),
                indexed: true,
            }),
        }
    }

    /// Resolve the `index`-th occurrence (1-based) of a repeated element,
    /// given how many occurrences the page currently renders
    pub fn resolve_nth(&self, name: &str, index: usize, count: usize) -> SwagResult<Selector> {
        match self.def(name)? {
            LocatorDef::Indexed { base } => {
                if index == 0 || index > count {
                    return Err(SwagError::IndexOutOfRange {
                        name: name.to_string(),
                        index,
                        count,
                    });
                }
                Ok(Selector::XPath(format!("({base})[{index}]")))
            }
            LocatorDef::Static(_) => Err(SwagError::LocatorArity {
                name: name.to_string(),
                indexed: false,
            }),
        }
    }

    /// Selector matching every occurrence of a locator, for counting
    pub fn resolve_all(&self, name: &str) -> SwagResult<Selector> {
        Ok(match self.def(name)? {
            LocatorDef::Static(selector) => selector.clone(),
            LocatorDef::Indexed { base } => Selector::XPath(base.clone()),
        })
    }

    /// Whether a name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether a name is registered as an indexed locator
    #[must_use]
    pub fn is_indexed(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(LocatorDef::is_indexed)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a resolved selector back to the locator that produced it
    #[must_use]
    pub fn identify(&self, selector: &Selector) -> Option<LocatorMatch<'_>> {
        if let Selector::XPath(expr) = selector {
            if let Some((base, index)) = split_indexed(expr) {
                return self.entries.iter().find_map(|(name, def)| match def {
                    LocatorDef::Indexed { base: b } if b == base => Some(LocatorMatch {
                        name: name.as_str(),
                        index: Some(index),
                    }),
                    _ => None,
                });
            }
        }

        self.entries.iter().find_map(|(name, def)| match def {
            LocatorDef::Static(s) if s == selector => Some(LocatorMatch {
                name: name.as_str(),
                index: None,
            }),
            LocatorDef::Indexed { base } if matches!(selector, Selector::XPath(x) if x == base) => {
                Some(LocatorMatch {
                    name: name.as_str(),
                    index: None,
                })
            }
            _ => None,
        })
    }
}

/// Split `(base)[n]` into `base` and `n`
fn split_indexed(expr: &str) -> Option<(&str, usize)> {
    let inner = expr.strip_prefix('(')?;
    let (base, rest) = inner.rsplit_once(")[")?;
    let index = rest.strip_suffix(']')?.parse().ok()?;
    Some((base, index))
}
