//! The upstream portal contract: URLs, login form fields, and the CSS
//! selectors of the summary table.
//!
//! Everything in here mirrors what the CEHZ portal's login form and report
//! page happen to look like today. An upstream markup change means changing
//! this file, nothing else.

/// Production login endpoint.
const LOGIN_URL: &str = "https://www.cehz.sk/user/Login.action";

/// Production summary report page.
const REPORT_URL: &str = "https://www.cehz.sk/summs/CehzSummHD.action";

/// The portal's public read-only account.
const PUBLIC_USERNAME: &str = "web";
const PUBLIC_PASSWORD: &str = "web";

/// Literal browser UA string. The portal rejects obviously non-browser
/// agents, and the login form echoes the same string in a `user_agent`
/// form field.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Stripes framework anti-automation tokens embedded in the login form.
/// Stale values cause a silent login failure, not an error page.
const SOURCE_PAGE_TOKEN: &str = "SYi4bqarXi_LV7MwLHZnfQZNmX-9l066";
const FP_TOKEN: &str = "hX-zHhkBJSE=";

/// Selectors for the summary table on the report page.
const TABLE_ROW_SELECTOR: &str = "table.form_tab tr";
const LABEL_SELECTOR: &str = "label";
const VALUE_SELECTOR: &str = "td.text_CehzSumm_Count";

/// Upstream contract for one scrape target: where to log in, where the
/// report lives, the exact login form field set, and the selectors that
/// locate label/value pairs in the report table.
#[derive(Clone)]
pub struct PortalConfig {
    pub login_url: String,
    pub report_url: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub source_page_token: String,
    pub fp_token: String,
    pub table_row_selector: String,
    pub label_selector: String,
    pub value_selector: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.to_string(),
            report_url: REPORT_URL.to_string(),
            username: PUBLIC_USERNAME.to_string(),
            password: PUBLIC_PASSWORD.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            source_page_token: SOURCE_PAGE_TOKEN.to_string(),
            fp_token: FP_TOKEN.to_string(),
            table_row_selector: TABLE_ROW_SELECTOR.to_string(),
            label_selector: LABEL_SELECTOR.to_string(),
            value_selector: VALUE_SELECTOR.to_string(),
        }
    }
}

impl PortalConfig {
    /// The complete login form field set, in the order the portal's own
    /// form submits them. The server expects exactly these fields;
    /// `doLogIn` is the submit button label and must be present.
    #[must_use]
    pub fn login_form(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("doLogIn", "Vstúpte"),
            ("user_agent", self.user_agent.as_str()),
            ("g-recaptcha-response", ""),
            ("_sourcePage", self.source_page_token.as_str()),
            ("__fp", self.fp_token.as_str()),
        ]
    }
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("login_url", &self.login_url)
            .field("report_url", &self.report_url)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("table_row_selector", &self.table_row_selector)
            .field("label_selector", &self.label_selector)
            .field("value_selector", &self.value_selector)
            .finish_non_exhaustive()
    }
}
