//! MockStorefront - an in-memory storefront implementing [`SessionDriver`].
//!
//! Simulates the pages the suites visit (login, listing, detail, cart), the
//! burger menu, the sort dropdown, cart toggling and outbound tabs. Selectors
//! are mapped back to locator names through [`LocatorRegistry::identify`], so
//! the mock answers exactly the selectors the registry hands out.
//!
//! Faults can be injected to check that the scenarios notice a broken site.

use async_trait::async_trait;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_PASSWORD, LOCKED_OUT_USER, STANDARD_USER};
use crate::driver::{ElementHandle, SessionDriver, WindowHandle};
use crate::locator::{names, LocatorRegistry, Selector};
use crate::result::{SwagError, SwagResult};
use crate::verify::{Price, SortOrder};

/// Products listed by the demo site, in default (name ascending) order
pub const CATALOGUE: [(&str, u64); 6] = [
    ("Sauce Labs Backpack", 2999),
    ("Sauce Labs Bike Light", 999),
    ("Sauce Labs Bolt T-Shirt", 1599),
    ("Sauce Labs Fleece Jacket", 4999),
    ("Sauce Labs Onesie", 799),
    ("Test.allTheThings() T-Shirt (Red)", 1599),
];

/// Page the About link leads to
pub const ABOUT_URL: &str = "https://saucelabs.com/";
/// Twitter footer target
pub const TWITTER_URL: &str = "https://x.com/saucelabs";
/// Facebook footer target
pub const FACEBOOK_URL: &str = "https://www.facebook.com/saucelabs";
/// LinkedIn footer target
pub const LINKEDIN_URL: &str = "https://www.linkedin.com/company/sauce-labs/";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Misbehaviour the mock can simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Selecting a sort option leaves the listing untouched
    IgnoreSort,
    /// Reset empties the cart but keeps the badge element rendered
    StaleBadgeAfterReset,
    /// Footer social links open nothing
    DeadSocialLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Login,
    Inventory,
    Detail(usize),
    Cart,
    External,
}

impl Page {
    const fn requires_login(self) -> bool {
        matches!(self, Self::Inventory | Self::Detail(_) | Self::Cart)
    }
}

#[derive(Debug, Clone)]
struct MockWindow {
    handle: WindowHandle,
    history: Vec<String>,
    position: usize,
}

impl MockWindow {
    fn new(handle: WindowHandle, url: String) -> Self {
        Self {
            handle,
            history: vec![url],
            position: 0,
        }
    }

    fn url(&self) -> &str {
        self.history
            .get(self.position)
            .map_or("about:blank", String::as_str)
    }

    fn visit(&mut self, url: String) {
        self.history.truncate(self.position + 1);
        self.history.push(url);
        self.position = self.history.len() - 1;
    }
}

/// In-memory storefront session
#[derive(Debug, Clone)]
pub struct MockStorefront {
    registry: LocatorRegistry,
    base_url: String,
    products: Vec<(String, Price)>,
    /// Product ids in rendered order
    listing: Vec<usize>,
    /// Product ids in the order they were added
    cart: Vec<usize>,
    stale_badge: bool,
    username: String,
    password: String,
    error: Option<String>,
    logged_in: bool,
    menu_open: bool,
    sort_open: bool,
    windows: Vec<MockWindow>,
    current: Option<usize>,
    next_window: usize,
    faults: Vec<Fault>,
    quit: bool,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl Default for MockStorefront {
    fn default() -> Self {
        let products: Vec<(String, Price)> = CATALOGUE
            .iter()
            .map(|(name, cents)| ((*name).to_string(), Price::from_cents(*cents)))
            .collect();
        Self {
            registry: LocatorRegistry::storefront(),
            base_url: DEFAULT_BASE_URL.to_string(),
            listing: (0..products.len()).collect(),
            products,
            cart: Vec::new(),
            stale_badge: false,
            username: String::new(),
            password: String::new(),
            error: None,
            logged_in: false,
            menu_open: false,
            sort_open: false,
            windows: vec![MockWindow::new(
                WindowHandle::new("window-0"),
                DEFAULT_BASE_URL.to_string(),
            )],
            current: Some(0),
            next_window: 1,
            faults: Vec::new(),
            quit: false,
            call_history: Vec::new(),
        }
    }
}

impl MockStorefront {
    /// Storefront showing the login page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the site under another base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        for window in &mut self.windows {
            window.history = vec![self.base_url.clone()];
            window.position = 0;
        }
        self
    }

    /// Replace the catalogue; products render in the given order
    #[must_use]
    pub fn with_products(mut self, products: &[(&str, u64)]) -> Self {
        self.products = products
            .iter()
            .map(|(name, cents)| ((*name).to_string(), Price::from_cents(*cents)))
            .collect();
        self.listing = (0..self.products.len()).collect();
        self.cart.clear();
        self
    }

    /// Inject a fault
    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Start authenticated on the product listing
    #[must_use]
    pub fn logged_in(mut self) -> Self {
        self.logged_in = true;
        let url = self.url_for("inventory.html");
        if let Some(window) = self.windows.first_mut() {
            window.visit(url);
        }
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Names of the products in the cart, in the order added
    #[must_use]
    pub fn cart_names(&self) -> Vec<String> {
        self.cart
            .iter()
            .filter_map(|id| self.products.get(*id))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of open windows
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Whether `quit` has been called
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        self.quit
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn ensure_open(&self) -> SwagResult<()> {
        if self.quit {
            return Err(SwagError::session("session has been closed"));
        }
        Ok(())
    }

    fn window(&self) -> SwagResult<&MockWindow> {
        self.ensure_open()?;
        self.current
            .and_then(|i| self.windows.get(i))
            .ok_or_else(|| SwagError::WindowError {
                message: "no such window: current window was closed".to_string(),
            })
    }

    fn window_mut(&mut self) -> SwagResult<&mut MockWindow> {
        self.ensure_open()?;
        let current = self.current;
        current
            .and_then(|i| self.windows.get_mut(i))
            .ok_or_else(|| SwagError::WindowError {
                message: "no such window: current window was closed".to_string(),
            })
    }

    fn page_of(&self, url: &str) -> Page {
        let Some(rest) = url.strip_prefix(self.base_url.trim_end_matches('/')) else {
            return Page::External;
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        match path {
            "" | "/" => Page::Login,
            "/inventory.html" => Page::Inventory,
            "/cart.html" => Page::Cart,
            "/inventory-item.html" => query
                .strip_prefix("id=")
                .and_then(|id| id.parse::<usize>().ok())
                .filter(|id| *id < self.products.len())
                .map_or(Page::External, Page::Detail),
            _ => Page::External,
        }
    }

    fn page(&self) -> SwagResult<Page> {
        Ok(self.page_of(self.window()?.url()))
    }

    fn reset_page_state(&mut self) {
        self.menu_open = false;
        self.sort_open = false;
        self.listing = (0..self.products.len()).collect();
        self.username.clear();
        self.password.clear();
    }

    fn load(&mut self, url: String) -> SwagResult<()> {
        let target = self.page_of(&url);
        let url = if target.requires_login() && !self.logged_in {
            let path = url
                .strip_prefix(self.base_url.trim_end_matches('/'))
                .unwrap_or(&url)
                .to_string();
            self.error = Some(format!(
                "Epic sadface: You can only access '{path}' when you are logged in."
            ));
            self.base_url.clone()
        } else {
            self.error = None;
            url
        };
        self.window_mut()?.visit(url);
        self.reset_page_state();
        Ok(())
    }

    fn open_window(&mut self, url: &str) {
        let handle = WindowHandle::new(format!("window-{}", self.next_window));
        self.next_window += 1;
        self.windows.push(MockWindow::new(handle, url.to_string()));
    }

    fn product(&self, id: usize) -> Option<&(String, Price)> {
        self.products.get(id)
    }

    /// Product id rendered at a 1-based listing position
    fn listed(&self, index: Option<usize>) -> Option<usize> {
        self.listing.get(index.unwrap_or(1).checked_sub(1)?).copied()
    }

    fn in_cart(&self, index: Option<usize>) -> Option<usize> {
        self.cart.get(index.unwrap_or(1).checked_sub(1)?).copied()
    }

    fn present(&self, page: Page, name: &str, index: Option<usize>) -> bool {
        use names::*;

        let signed_in = matches!(page, Page::Inventory | Page::Detail(_) | Page::Cart);
        match name {
            USER_NAME_FIELD | PASSWORD_FIELD | LOGIN_BUTTON => page == Page::Login,
            ERROR_MESSAGE | ERROR_CLOSE_BUTTON => page == Page::Login && self.error.is_some(),
            MENU_BUTTON | MENU_CLOSE_BUTTON | LOGOUT_LINK | ABOUT_LINK | RESET_LINK
            | CART_BUTTON | SOCIAL_TWITTER | SOCIAL_FACEBOOK | SOCIAL_LINKEDIN => signed_in,
            CART_BADGE => signed_in && (!self.cart.is_empty() || self.stale_badge),
            SORT_SELECT | SORT_NAME_ASC | SORT_NAME_DESC | SORT_PRICE_ASC | SORT_PRICE_DESC => {
                page == Page::Inventory
            }
            PRODUCT_CARD | PRODUCT_NAME | PRODUCT_PRICE | ADD_BUTTON | PRODUCT_TITLE_LINK => {
                page == Page::Inventory && self.listed(index).is_some()
            }
            DETAIL_NAME | BACK_TO_PRODUCTS => matches!(page, Page::Detail(_)),
            CONTINUE_SHOPPING => page == Page::Cart,
            CART_ITEM_NAME => page == Page::Cart && self.in_cart(index).is_some(),
            _ => false,
        }
    }

    fn displayed(&self, name: &str) -> bool {
        use names::*;

        match name {
            MENU_CLOSE_BUTTON | LOGOUT_LINK | ABOUT_LINK | RESET_LINK => self.menu_open,
            SORT_NAME_ASC | SORT_NAME_DESC | SORT_PRICE_ASC | SORT_PRICE_DESC => self.sort_open,
            _ => true,
        }
    }

    /// Identify a selector and check the element is on the current page
    fn locate(&self, selector: &Selector) -> SwagResult<(String, Option<usize>, Page)> {
        let page = self.page()?;
        let Some(found) = self.registry.identify(selector) else {
            return Err(SwagError::no_such_element(selector.to_string()));
        };
        if !self.present(page, found.name, found.index) {
            return Err(SwagError::no_such_element(selector.to_string()));
        }
        Ok((found.name.to_string(), found.index, page))
    }

    fn render_text(&self, page: Page, name: &str, index: Option<usize>) -> String {
        use names::*;

        let product_name = |id: Option<usize>| {
            id.and_then(|id| self.product(id))
                .map(|(name, _)| name.clone())
                .unwrap_or_default()
        };
        match name {
            ERROR_MESSAGE => self.error.clone().unwrap_or_default(),
            LOGIN_BUTTON => "Login".to_string(),
            PRODUCT_NAME | PRODUCT_TITLE_LINK => product_name(self.listed(index)),
            PRODUCT_PRICE => self
                .listed(index)
                .and_then(|id| self.product(id))
                .map(|(_, price)| price.to_string())
                .unwrap_or_default(),
            PRODUCT_CARD => self
                .listed(index)
                .and_then(|id| self.product(id))
                .map(|(name, price)| format!("{name}\n{price}"))
                .unwrap_or_default(),
            ADD_BUTTON => match self.listed(index) {
                Some(id) if self.cart.contains(&id) => "Remove".to_string(),
                _ => "Add to cart".to_string(),
            },
            CART_BADGE if self.cart.is_empty() => String::new(),
            CART_BADGE => self.cart.len().to_string(),
            DETAIL_NAME => match page {
                Page::Detail(id) => product_name(Some(id)),
                _ => String::new(),
            },
            CART_ITEM_NAME => product_name(self.in_cart(index)),
            SORT_NAME_ASC => SortOrder::NameAscending.label().to_string(),
            SORT_NAME_DESC => SortOrder::NameDescending.label().to_string(),
            SORT_PRICE_ASC => SortOrder::PriceAscending.label().to_string(),
            SORT_PRICE_DESC => SortOrder::PriceDescending.label().to_string(),
            LOGOUT_LINK => "Logout".to_string(),
            ABOUT_LINK => "About".to_string(),
            RESET_LINK => "Reset App State".to_string(),
            BACK_TO_PRODUCTS => "Back to products".to_string(),
            CONTINUE_SHOPPING => "Continue Shopping".to_string(),
            _ => String::new(),
        }
    }

    fn submit_login(&mut self) -> SwagResult<()> {
        let error = if self.username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if self.password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if self.password != DEFAULT_PASSWORD {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if self.username == LOCKED_OUT_USER {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else if self.username == STANDARD_USER {
            None
        } else {
            Some("Epic sadface: Username and password do not match any user in this service")
        };

        match error {
            Some(message) => {
                self.error = Some(message.to_string());
                Ok(())
            }
            None => {
                self.logged_in = true;
                let url = self.url_for("inventory.html");
                self.load(url)
            }
        }
    }

    fn apply_sort(&mut self, order: SortOrder) {
        self.sort_open = false;
        if self.has_fault(Fault::IgnoreSort) {
            return;
        }
        let products = &self.products;
        match order {
            SortOrder::NameAscending | SortOrder::NameDescending => {
                self.listing.sort_by(|a, b| products[*a].0.cmp(&products[*b].0));
            }
            SortOrder::PriceAscending | SortOrder::PriceDescending => {
                self.listing.sort_by_key(|id| products[*id].1);
            }
        }
        if !order.is_ascending() {
            self.listing.reverse();
        }
    }

    fn toggle_cart(&mut self, id: usize) {
        if let Some(pos) = self.cart.iter().position(|c| *c == id) {
            let _ = self.cart.remove(pos);
        } else {
            self.cart.push(id);
            self.stale_badge = false;
        }
    }

    fn follow_social(&mut self, url: &str) {
        if !self.has_fault(Fault::DeadSocialLinks) {
            self.open_window(url);
        }
    }
}

#[async_trait]
impl SessionDriver for MockStorefront {
    async fn get(&mut self, url: &str) -> SwagResult<()> {
        self.call_history.push(format!("get:{url}"));
        self.load(url.to_string())
    }

    async fn find_element(&self, selector: &Selector) -> SwagResult<ElementHandle> {
        let (name, index, page) = self.locate(selector)?;
        Ok(ElementHandle::new(selector.clone())
            .with_tag(if name.ends_with("_field") { "input" } else { "div" })
            .with_text(self.render_text(page, &name, index)))
    }

    async fn click(&mut self, selector: &Selector) -> SwagResult<()> {
        use names::*;

        self.call_history.push(format!("click:{selector}"));
        let (name, index, _) = self.locate(selector)?;
        if !self.displayed(&name) {
            return Err(SwagError::ElementNotInteractable {
                selector: selector.to_string(),
            });
        }

        match name.as_str() {
            LOGIN_BUTTON => self.submit_login()?,
            ERROR_CLOSE_BUTTON => self.error = None,
            MENU_BUTTON => self.menu_open = true,
            MENU_CLOSE_BUTTON => self.menu_open = false,
            LOGOUT_LINK => {
                self.logged_in = false;
                let url = self.base_url.clone();
                self.load(url)?;
            }
            ABOUT_LINK => self.load(ABOUT_URL.to_string())?,
            RESET_LINK => {
                self.cart.clear();
                self.stale_badge = self.has_fault(Fault::StaleBadgeAfterReset);
            }
            SORT_SELECT => self.sort_open = !self.sort_open,
            SORT_NAME_ASC => self.apply_sort(SortOrder::NameAscending),
            SORT_NAME_DESC => self.apply_sort(SortOrder::NameDescending),
            SORT_PRICE_ASC => self.apply_sort(SortOrder::PriceAscending),
            SORT_PRICE_DESC => self.apply_sort(SortOrder::PriceDescending),
            ADD_BUTTON => {
                if let Some(id) = self.listed(index) {
                    self.toggle_cart(id);
                }
            }
            PRODUCT_TITLE_LINK => {
                if let Some(id) = self.listed(index) {
                    let url = self.url_for(&format!("inventory-item.html?id={id}"));
                    self.load(url)?;
                }
            }
            CART_BUTTON => {
                let url = self.url_for("cart.html");
                self.load(url)?;
            }
            CONTINUE_SHOPPING | BACK_TO_PRODUCTS => {
                let url = self.url_for("inventory.html");
                self.load(url)?;
            }
            SOCIAL_TWITTER => self.follow_social(TWITTER_URL),
            SOCIAL_FACEBOOK => self.follow_social(FACEBOOK_URL),
            SOCIAL_LINKEDIN => self.follow_social(LINKEDIN_URL),
            _ => {}
        }
        Ok(())
    }

    async fn send_keys(&mut self, selector: &Selector, text: &str) -> SwagResult<()> {
        self.call_history.push(format!("send_keys:{selector}"));
        let (name, _, _) = self.locate(selector)?;
        match name.as_str() {
            names::USER_NAME_FIELD => self.username.push_str(text),
            names::PASSWORD_FIELD => self.password.push_str(text),
            _ => {
                return Err(SwagError::ElementNotInteractable {
                    selector: selector.to_string(),
                })
            }
        }
        Ok(())
    }

    async fn text(&self, selector: &Selector) -> SwagResult<String> {
        let (name, index, page) = self.locate(selector)?;
        Ok(self.render_text(page, &name, index))
    }

    async fn is_displayed(&self, selector: &Selector) -> SwagResult<bool> {
        let (name, _, _) = self.locate(selector)?;
        Ok(self.displayed(&name))
    }

    async fn count(&self, selector: &Selector) -> SwagResult<usize> {
        let page = self.page()?;
        let Some(found) = self.registry.identify(selector) else {
            return Ok(0);
        };
        if found.index.is_none() && self.registry.is_indexed(found.name) {
            let rendered = match found.name {
                names::CART_ITEM_NAME if page == Page::Cart => self.cart.len(),
                names::CART_ITEM_NAME => 0,
                _ if page == Page::Inventory => self.listing.len(),
                _ => 0,
            };
            return Ok(rendered);
        }
        Ok(usize::from(self.present(page, found.name, found.index)))
    }

    async fn ready_state(&self) -> SwagResult<String> {
        self.window()?;
        Ok("complete".to_string())
    }

    async fn current_url(&self) -> SwagResult<String> {
        Ok(self.window()?.url().to_string())
    }

    async fn screenshot(&self) -> SwagResult<Vec<u8>> {
        let window = self.window()?;
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(window.url().as_bytes());
        Ok(png)
    }

    async fn window_handles(&self) -> SwagResult<Vec<WindowHandle>> {
        self.ensure_open()?;
        Ok(self.windows.iter().map(|w| w.handle.clone()).collect())
    }

    async fn current_window(&self) -> SwagResult<WindowHandle> {
        Ok(self.window()?.handle.clone())
    }

    async fn switch_to_window(&mut self, handle: &WindowHandle) -> SwagResult<()> {
        self.call_history.push(format!("switch_to_window:{handle}"));
        self.ensure_open()?;
        let position = self
            .windows
            .iter()
            .position(|w| &w.handle == handle)
            .ok_or_else(|| SwagError::WindowError {
                message: format!("no such window: {handle}"),
            })?;
        self.current = Some(position);
        Ok(())
    }

    async fn close_window(&mut self) -> SwagResult<()> {
        self.call_history.push("close_window".to_string());
        self.window()?;
        if let Some(position) = self.current.take() {
            let _ = self.windows.remove(position);
        }
        Ok(())
    }

    async fn back(&mut self) -> SwagResult<()> {
        self.call_history.push("back".to_string());
        let window = self.window_mut()?;
        window.position = window.position.saturating_sub(1);
        self.reset_page_state();
        Ok(())
    }

    async fn forward(&mut self) -> SwagResult<()> {
        self.call_history.push("forward".to_string());
        let window = self.window_mut()?;
        if window.position + 1 < window.history.len() {
            window.position += 1;
        }
        self.reset_page_state();
        Ok(())
    }

    async fn refresh(&mut self) -> SwagResult<()> {
        self.call_history.push("refresh".to_string());
        self.window()?;
        self.error = None;
        self.reset_page_state();
        Ok(())
    }

    async fn quit(&mut self) -> SwagResult<()> {
        self.call_history.push("quit".to_string());
        self.ensure_open()?;
        self.quit = true;
        self.windows.clear();
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sel(name: &str) -> Selector {
        LocatorRegistry::storefront().resolve(name).unwrap()
    }

    fn nth(name: &str, index: usize) -> Selector {
        LocatorRegistry::storefront()
            .resolve_nth(name, index, CATALOGUE.len())
            .unwrap()
    }

    async fn login(mock: &mut MockStorefront, user: &str, password: &str) {
        if !user.is_empty() {
            mock.send_keys(&sel(names::USER_NAME_FIELD), user)
                .await
                .unwrap();
        }
        if !password.is_empty() {
            mock.send_keys(&sel(names::PASSWORD_FIELD), password)
                .await
                .unwrap();
        }
        mock.click(&sel(names::LOGIN_BUTTON)).await.unwrap();
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_messages() {
            let cases = [
                ("", "", "Epic sadface: Username is required"),
                ("", DEFAULT_PASSWORD, "Epic sadface: Username is required"),
                (STANDARD_USER, "", "Epic sadface: Password is required"),
                (
                    LOCKED_OUT_USER,
                    DEFAULT_PASSWORD,
                    "Epic sadface: Sorry, this user has been locked out.",
                ),
            ];
            for (user, password, expected) in cases {
                let mut mock = MockStorefront::new();
                login(&mut mock, user, password).await;
                assert_eq!(
                    mock.text(&sel(names::ERROR_MESSAGE)).await.unwrap(),
                    expected
                );
            }
        }

        #[tokio::test]
        async fn test_standard_login_lands_on_inventory() {
            let mut mock = MockStorefront::new();
            login(&mut mock, STANDARD_USER, DEFAULT_PASSWORD).await;
            assert_eq!(
                mock.current_url().await.unwrap(),
                "https://www.saucedemo.com/inventory.html"
            );
            assert_eq!(mock.count(&sel(names::ERROR_MESSAGE)).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_error_close_and_refresh() {
            let mut mock = MockStorefront::new();
            login(&mut mock, "", "").await;
            mock.click(&sel(names::ERROR_CLOSE_BUTTON)).await.unwrap();
            assert!(mock.find_element(&sel(names::ERROR_MESSAGE)).await.is_err());

            mock.send_keys(&sel(names::USER_NAME_FIELD), "someone")
                .await
                .unwrap();
            mock.refresh().await.unwrap();
            login(&mut mock, "", DEFAULT_PASSWORD).await;
            assert_eq!(
                mock.text(&sel(names::ERROR_MESSAGE)).await.unwrap(),
                "Epic sadface: Username is required"
            );
        }

        #[tokio::test]
        async fn test_inventory_requires_login() {
            let mut mock = MockStorefront::new();
            mock.get("https://www.saucedemo.com/inventory.html")
                .await
                .unwrap();
            assert_eq!(
                mock.current_url().await.unwrap(),
                "https://www.saucedemo.com/"
            );
            assert!(mock
                .text(&sel(names::ERROR_MESSAGE))
                .await
                .unwrap()
                .contains("when you are logged in"));
        }
    }

    mod listing_tests {
        use super::*;

        #[tokio::test]
        async fn test_counts_products() {
            let mock = MockStorefront::new().logged_in();
            let all = LocatorRegistry::storefront()
                .resolve_all(names::PRODUCT_CARD)
                .unwrap();
            assert_eq!(mock.count(&all).await.unwrap(), 6);
            assert_eq!(
                mock.text(&nth(names::PRODUCT_PRICE, 2)).await.unwrap(),
                "$9.99"
            );
        }

        #[tokio::test]
        async fn test_sort_by_price_descending() {
            let mut mock = MockStorefront::new().logged_in();
            assert!(mock
                .click(&sel(names::SORT_PRICE_DESC))
                .await
                .is_err_and(|e| matches!(e, SwagError::ElementNotInteractable { .. })));
            mock.click(&sel(names::SORT_SELECT)).await.unwrap();
            mock.click(&sel(names::SORT_PRICE_DESC)).await.unwrap();
            assert_eq!(
                mock.text(&nth(names::PRODUCT_PRICE, 1)).await.unwrap(),
                "$49.99"
            );
            assert_eq!(
                mock.text(&nth(names::PRODUCT_PRICE, 6)).await.unwrap(),
                "$7.99"
            );
        }

        #[tokio::test]
        async fn test_ignore_sort_fault() {
            let mut mock = MockStorefront::new().logged_in().with_fault(Fault::IgnoreSort);
            mock.click(&sel(names::SORT_SELECT)).await.unwrap();
            mock.click(&sel(names::SORT_NAME_DESC)).await.unwrap();
            assert_eq!(
                mock.text(&nth(names::PRODUCT_NAME, 1)).await.unwrap(),
                "Sauce Labs Backpack"
            );
        }

        #[tokio::test]
        async fn test_add_button_toggles_badge() {
            let mut mock = MockStorefront::new().logged_in();
            let badge = sel(names::CART_BADGE);
            assert!(mock
                .find_element(&badge)
                .await
                .is_err_and(|e| e.is_not_found()));

            mock.click(&nth(names::ADD_BUTTON, 3)).await.unwrap();
            mock.click(&nth(names::ADD_BUTTON, 1)).await.unwrap();
            assert_eq!(mock.text(&badge).await.unwrap(), "2");
            assert_eq!(
                mock.text(&nth(names::ADD_BUTTON, 3)).await.unwrap(),
                "Remove"
            );

            mock.click(&nth(names::ADD_BUTTON, 3)).await.unwrap();
            assert_eq!(mock.text(&badge).await.unwrap(), "1");
            assert_eq!(mock.cart_names(), vec!["Sauce Labs Backpack"]);
        }

        #[tokio::test]
        async fn test_out_of_range_position_is_absent() {
            let mock = MockStorefront::new().logged_in();
            let seventh = LocatorRegistry::storefront()
                .resolve_nth(names::PRODUCT_NAME, 7, 10)
                .unwrap();
            assert!(mock
                .text(&seventh)
                .await
                .is_err_and(|e| e.is_not_found()));
        }
    }

    mod menu_tests {
        use super::*;

        #[tokio::test]
        async fn test_reset_clears_cart_and_badge() {
            let mut mock = MockStorefront::new().logged_in();
            mock.click(&nth(names::ADD_BUTTON, 2)).await.unwrap();
            mock.click(&sel(names::MENU_BUTTON)).await.unwrap();
            assert!(mock.is_displayed(&sel(names::RESET_LINK)).await.unwrap());
            mock.click(&sel(names::RESET_LINK)).await.unwrap();
            assert_eq!(mock.count(&sel(names::CART_BADGE)).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_stale_badge_fault() {
            let mut mock = MockStorefront::new()
                .logged_in()
                .with_fault(Fault::StaleBadgeAfterReset);
            mock.click(&nth(names::ADD_BUTTON, 2)).await.unwrap();
            mock.click(&sel(names::MENU_BUTTON)).await.unwrap();
            mock.click(&sel(names::RESET_LINK)).await.unwrap();
            assert_eq!(mock.text(&sel(names::CART_BADGE)).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_about_then_back() {
            let mut mock = MockStorefront::new().logged_in();
            mock.click(&sel(names::MENU_BUTTON)).await.unwrap();
            mock.click(&sel(names::ABOUT_LINK)).await.unwrap();
            assert_eq!(mock.current_url().await.unwrap(), ABOUT_URL);
            mock.back().await.unwrap();
            assert!(mock.current_url().await.unwrap().ends_with("/inventory.html"));
            assert!(!mock.is_displayed(&sel(names::LOGOUT_LINK)).await.unwrap());
            mock.forward().await.unwrap();
            assert_eq!(mock.current_url().await.unwrap(), ABOUT_URL);
        }

        #[tokio::test]
        async fn test_logout() {
            let mut mock = MockStorefront::new().logged_in();
            mock.click(&sel(names::MENU_BUTTON)).await.unwrap();
            mock.click(&sel(names::LOGOUT_LINK)).await.unwrap();
            assert_eq!(
                mock.current_url().await.unwrap(),
                "https://www.saucedemo.com/"
            );
            assert!(mock.find_element(&sel(names::LOGIN_BUTTON)).await.is_ok());
        }
    }

    mod window_tests {
        use super::*;

        #[tokio::test]
        async fn test_social_link_opens_window_without_focus() {
            let mut mock = MockStorefront::new().logged_in();
            let main = mock.current_window().await.unwrap();
            mock.click(&sel(names::SOCIAL_LINKEDIN)).await.unwrap();

            let handles = mock.window_handles().await.unwrap();
            assert_eq!(handles.len(), 2);
            assert_eq!(mock.current_window().await.unwrap(), main);

            mock.switch_to_window(&handles[1]).await.unwrap();
            assert_eq!(mock.current_url().await.unwrap(), LINKEDIN_URL);
            mock.close_window().await.unwrap();
            assert!(mock
                .current_url()
                .await
                .is_err_and(|e| matches!(e, SwagError::WindowError { .. })));

            mock.switch_to_window(&main).await.unwrap();
            assert_eq!(mock.window_count(), 1);
        }

        #[tokio::test]
        async fn test_unknown_window() {
            let mut mock = MockStorefront::new();
            let err = mock
                .switch_to_window(&WindowHandle::new("nope"))
                .await
                .unwrap_err();
            assert!(matches!(err, SwagError::WindowError { .. }));
        }
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_quit_once() {
            let mut mock = MockStorefront::new();
            mock.quit().await.unwrap();
            assert!(mock.is_quit());
            assert!(mock.quit().await.unwrap_err().is_fatal());
            assert!(mock.current_url().await.unwrap_err().is_fatal());
            assert!(mock.was_called("quit"));
        }

        #[tokio::test]
        async fn test_screenshot_is_png() {
            let mock = MockStorefront::new();
            let bytes = mock.screenshot().await.unwrap();
            assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        }

        #[tokio::test]
        async fn test_custom_base_url() {
            let mut mock = MockStorefront::new()
                .with_base_url("http://localhost:8080/")
                .with_products(&[("Widget", 100)]);
            login(&mut mock, STANDARD_USER, DEFAULT_PASSWORD).await;
            assert_eq!(
                mock.current_url().await.unwrap(),
                "http://localhost:8080/inventory.html"
            );
            assert_eq!(
                mock.text(&nth(names::PRODUCT_NAME, 1)).await.unwrap(),
                "Widget"
            );
        }
    }
}
