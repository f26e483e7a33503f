//! Hosted button management on top of NVP.
//!
//! Each operation wraps one `BM*` NVP method. A request PayPal declines is not an error here:
//! the operation yields `None` (or `false`) and the caller decides what to do. Transport
//! faults still fail.

use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, Utc};

use crate::{
    concepts::NvpApi,
    errors::Result,
    nvp::NvpResponse,
    types::{Fields, fields, group_indexed, indexed},
};

/// Start of the search window when none is given.
pub const DEFAULT_SEARCH_START: &str = "1999-01-01T00:00:00Z";

/// Date format of `STARTDATE` / `ENDDATE`.
pub const SEARCH_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A button definition for create and update calls.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct HostedButton {
    /// Sent as the `item_name` button variable.
    #[builder(into)]
    pub name: String,
    /// Sent as the `amount` button variable.
    #[builder(into)]
    pub amount: String,
    #[builder(into, default = "BUYNOW".to_string())]
    pub button_type: String,
    #[builder(into, default = "PRODUCTS".to_string())]
    pub sub_type: String,
}

impl HostedButton {
    fn params(&self) -> Fields {
        fields([
            ("BUTTONTYPE", self.button_type.clone()),
            ("BUTTONSUBTYPE", self.sub_type.clone()),
            ("L_BUTTONVAR0", format!("item_name={}", self.name)),
            ("L_BUTTONVAR1", format!("amount={}", self.amount)),
        ])
    }
}

/// A button as listed by a button search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonRecord {
    pub id: String,
    pub button_type: Option<String>,
    pub item_name: Option<String>,
    pub modify_date: Option<String>,
}

/// Hosted button operations over any [`NvpApi`], typically an
/// [`NvpClient`](crate::nvp::NvpClient) or a reference to one.
#[derive(Debug, Clone)]
pub struct ButtonManager<C> {
    client: C,
}

impl<C: NvpApi> ButtonManager<C> {
    pub fn new(client: C) -> Self {
        ButtonManager { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// `BMCreateButton`. Returns the response when PayPal accepted the button.
    pub async fn create_button(&self, button: &HostedButton) -> Result<Option<NvpResponse>> {
        let response = self.client.send("BMCreateButton", button.params()).await?;
        Ok(response.is_success().then_some(response))
    }

    /// `BMUpdateButton` for `button_id`. Returns the response when PayPal accepted the update.
    pub async fn update_button(
        &self,
        button_id: &str,
        button: &HostedButton,
    ) -> Result<Option<NvpResponse>> {
        let mut params = button.params();
        params.insert("HOSTEDBUTTONID".to_string(), button_id.to_string());

        let response = self.client.send("BMUpdateButton", params).await?;
        Ok(response.is_success().then_some(response))
    }

    /// `BMManageButtonStatus` with `BUTTONSTATUS=DELETE`. Returns whether PayPal accepted it.
    pub async fn delete_button(&self, button_id: &str) -> Result<bool> {
        let params = fields([("HOSTEDBUTTONID", button_id), ("BUTTONSTATUS", "DELETE")]);

        let response = self.client.send("BMManageButtonStatus", params).await?;
        Ok(response.is_success())
    }

    /// `BMButtonSearch` between `start` (default [`DEFAULT_SEARCH_START`]) and `end`.
    ///
    /// The buttons found are keyed by the index PayPal listed them under.
    pub async fn search_buttons(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Option<BTreeMap<u32, ButtonRecord>>> {
        let start_date = start.map_or_else(
            || DEFAULT_SEARCH_START.to_string(),
            |start| start.format(SEARCH_DATE_FORMAT).to_string(),
        );

        let mut params = fields([("STARTDATE", start_date)]);
        if let Some(end) = end {
            params.insert(
                "ENDDATE".to_string(),
                end.format(SEARCH_DATE_FORMAT).to_string(),
            );
        }

        let response = self.client.send("BMButtonSearch", params).await?;
        if !response.is_success() {
            return Ok(None);
        }

        let buttons = button_records(&response.fields);

        #[cfg(feature = "tracing")]
        tracing::debug!("Button search found {} buttons", buttons.len());

        Ok(Some(buttons))
    }

    /// `BMGetButtonDetails` for `button_id`. Returns the raw response fields on success.
    pub async fn get_button(&self, button_id: &str) -> Result<Option<Fields>> {
        let params = fields([("HOSTEDBUTTONID", button_id)]);

        let response = self.client.send("BMGetButtonDetails", params).await?;
        Ok(response.is_success().then_some(response.fields))
    }
}

/// Decode the `L_HOSTEDBUTTONIDn` family of a search response into button records.
///
/// Indices without an id are skipped.
pub fn button_records(fields: &Fields) -> BTreeMap<u32, ButtonRecord> {
    group_indexed(
        fields,
        &["L_HOSTEDBUTTONID", "L_BUTTONTYPE", "L_ITEMNAME", "L_MODIFYDATE"],
    )
    .into_iter()
    .filter_map(|(index, group)| {
        let field = |prefix: &str| group.get(prefix).map(|v| v.to_string());
        let record = ButtonRecord {
            id: field("L_HOSTEDBUTTONID")?,
            button_type: field("L_BUTTONTYPE"),
            item_name: field("L_ITEMNAME"),
            modify_date: field("L_MODIFYDATE"),
        };
        Some((index, record))
    })
    .collect()
}

/// Decode a button's `L_BUTTONVARn` fields into variable name / value pairs.
///
/// Values look like `"amount=9.99"`: surrounding quotes are stripped and the text is split at
/// the first `=`. A variable without `=` maps to an empty value; one without a name is
/// skipped.
///
/// ```
/// use paypal_nvp::{button_manager::extract_button_variables, types::fields};
///
/// let button = fields([
///     ("L_BUTTONVAR0", "\"item_name=Widget\""),
///     ("L_BUTTONVAR1", "\"amount=9.99\""),
/// ]);
///
/// let vars = extract_button_variables(&button);
/// assert_eq!(vars["item_name"], "Widget");
/// assert_eq!(vars["amount"], "9.99");
/// ```
pub fn extract_button_variables(fields: &Fields) -> BTreeMap<String, String> {
    indexed(fields, "L_BUTTONVAR")
        .into_values()
        .filter_map(|raw| {
            let unquoted = raw.trim_matches('"');
            let (name, value) = unquoted.split_once('=').unwrap_or((unquoted, ""));
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}
