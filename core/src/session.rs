//! Form state for adding and editing products.
//!
//! # Design
//! A `Session` owns the draft the user is typing into and, when editing,
//! the id of the product being edited. It never talks to the network
//! itself: `save` validates the draft, turns it into a `ProductBody` and
//! hands it to the shared `SyncStore` as either a create or an update.
//!
//! The draft is cleared only after a save fully succeeds (including the
//! store's refetch). Any failure leaves it exactly as the user left it.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::device::{Camera, Confirm};
use crate::error::{ApiResult, SessionResult, ValidationError};
use crate::store::SyncStore;
use crate::transport::Transport;
use crate::types::{Product, ProductBody, ProductId};

/// Prompt shown before a product is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";

/// Editable product fields, kept as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    /// Raw price text; parsed only on save.
    pub price: String,
    pub description: String,
    /// Stored reference or inline data URI.
    pub image: Option<String>,
}

impl Draft {
    /// Copy a product's fields verbatim. The price is rendered with `f64`'s
    /// `Display`, or left empty when the product has none.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.map(|price| price.to_string()).unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            image: product.image.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate and build the request body.
    pub fn to_body(&self) -> Result<ProductBody, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(ProductBody {
            name: name.to_string(),
            price: parse_price(&self.price)?,
            description: self.description.trim().to_string(),
            image: self.image.clone(),
        })
    }
}

/// Empty text means no price. Anything else, `"0"` included, must parse to a
/// finite number.
fn parse_price(text: &str) -> Result<Option<f64>, ValidationError> {
    if text.is_empty() {
        return Ok(None);
    }
    match text.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(Some(price)),
        _ => Err(ValidationError::InvalidPrice(text.to_string())),
    }
}

/// Result of a successful save, carrying the server's echo of the record
/// when it sent one.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Created(Option<Product>),
    Updated(Option<Product>),
}

impl SaveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::Created(_) => "Product added",
            SaveOutcome::Updated(_) => "Product updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

impl DeleteOutcome {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DeleteOutcome::Deleted => Some("Product removed"),
            DeleteOutcome::Cancelled => None,
        }
    }
}

/// First half of a delete: the user asked to delete, nothing has been sent.
#[must_use = "a delete intent does nothing until it is resolved"]
pub struct DeleteIntent<'a, T> {
    store: &'a SyncStore<T>,
    id: ProductId,
}

impl<T: Transport> DeleteIntent<'_, T> {
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn message(&self) -> &'static str {
        DELETE_PROMPT
    }

    /// Second half: on confirmation issue the delete (and the store's
    /// refetch); on cancellation do nothing.
    pub async fn resolve(self, confirmed: bool) -> ApiResult<DeleteOutcome> {
        if !confirmed {
            debug!(id = %self.id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        self.store.delete(&self.id).await?;
        Ok(DeleteOutcome::Deleted)
    }
}

/// The add/edit form bound to a shared store.
pub struct Session<T> {
    store: Rc<SyncStore<T>>,
    draft: Draft,
    editing_id: Option<ProductId>,
}

impl<T: Transport> Session<T> {
    pub fn new(store: Rc<SyncStore<T>>) -> Self {
        Self {
            store,
            draft: Draft::default(),
            editing_id: None,
        }
    }

    pub fn store(&self) -> &SyncStore<T> {
        &self.store
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<&ProductId> {
        self.editing_id.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_price(&mut self, price: impl Into<String>) {
        self.draft.price = price.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_image(&mut self, image: impl Into<String>) {
        self.draft.image = Some(image.into());
    }

    pub fn clear_image(&mut self) {
        self.draft.image = None;
    }

    /// Load a product into the form. No network call.
    pub fn edit(&mut self, product: &Product) {
        self.editing_id = product.id.clone();
        self.draft = Draft::from_product(product);
    }

    /// Drop the draft and leave edit mode. No network call.
    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.draft = Draft::default();
    }

    /// Label for the save button, following the store's posting flag.
    pub fn save_label(&self) -> &'static str {
        match (self.store.is_posting(), self.is_editing()) {
            (true, true) => "Saving...",
            (true, false) => "Adding...",
            (false, true) => "Save",
            (false, false) => "Add Product",
        }
    }

    /// Validate the draft and create or update the product.
    pub async fn save(&mut self) -> SessionResult<SaveOutcome> {
        let body = self.draft.to_body().inspect_err(|e| {
            debug!(error = %e, "draft rejected");
        })?;

        let outcome = match self.editing_id.clone() {
            Some(id) => {
                let updated = self.store.update(&id, &body).await?;
                self.editing_id = None;
                SaveOutcome::Updated(updated)
            }
            None => SaveOutcome::Created(self.store.create(&body).await?),
        };

        self.draft = Draft::default();
        Ok(outcome)
    }

    /// Ask the camera for a photo and attach it to the draft. Returns whether
    /// a photo was taken; a cancelled capture leaves the current image alone.
    pub async fn take_photo<C: Camera + ?Sized>(&mut self, camera: &C) -> SessionResult<bool> {
        let photo = camera.capture_photo().await.inspect_err(|e| {
            warn!(error = %e, "photo capture failed");
        })?;
        match photo {
            Some(photo) => {
                self.draft.image = Some(photo.to_data_uri());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Start a delete. Nothing is sent until the intent is resolved.
    pub fn request_delete(&self, id: ProductId) -> DeleteIntent<'_, T> {
        DeleteIntent {
            store: self.store.as_ref(),
            id,
        }
    }

    /// Delete after asking the user through `confirm`.
    pub async fn delete_with<C: Confirm + ?Sized>(
        &self,
        id: ProductId,
        confirm: &C,
    ) -> SessionResult<DeleteOutcome> {
        let intent = self.request_delete(id);
        let confirmed = confirm.confirm(intent.message()).await;
        Ok(intent.resolve(confirmed).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use async_trait::async_trait;

    use super::*;
    use crate::api::ProductApi;
    use crate::client::ProductClient;
    use crate::error::{ApiError, CaptureError, SessionError};
    use crate::http::HttpMethod;
    use crate::image::CapturedPhoto;
    use crate::test_support::ScriptedTransport;

    fn session(transport: &Rc<ScriptedTransport>) -> Session<Rc<ScriptedTransport>> {
        let api = ProductApi::new(ProductClient::new("http://api.test"), transport.clone());
        Session::new(Rc::new(SyncStore::new(api)))
    }

    fn sent_body(transport: &ScriptedTransport, index: usize) -> serde_json::Value {
        let request = &transport.requests()[index];
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    fn mug() -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "m1",
            "name": "Mug",
            "price": 9.99,
            "description": "Blue",
            "image": "https://cdn.example.com/mug.jpg"
        }))
        .unwrap()
    }

    struct FixedCamera(RefCell<Option<Result<Option<CapturedPhoto>, CaptureError>>>);

    #[async_trait(?Send)]
    impl Camera for FixedCamera {
        async fn capture_photo(&self) -> Result<Option<CapturedPhoto>, CaptureError> {
            self.0.borrow_mut().take().unwrap_or(Ok(None))
        }
    }

    struct Answer {
        yes: bool,
        asked: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl Confirm for Answer {
        async fn confirm(&self, message: &str) -> bool {
            self.asked.borrow_mut().push(message.to_string());
            self.yes
        }
    }

    fn answer(yes: bool) -> Answer {
        Answer {
            yes,
            asked: RefCell::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_network() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);

        for name in ["", "   ", "\t\n"] {
            session.set_name(name);
            let err = session.save().await.unwrap_err();
            assert_eq!(err, SessionError::Validation(ValidationError::EmptyName));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_price_is_rejected_without_network() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);
        session.set_name("Mug");

        for price in ["abc", "12abc", "NaN", "inf", " "] {
            session.set_price(price);
            let err = session.save().await.unwrap_err();
            assert_eq!(
                err,
                SessionError::Validation(ValidationError::InvalidPrice(price.to_string()))
            );
        }
        assert!(transport.requests().is_empty());
        assert_eq!(session.draft().name, "Mug");
    }

    #[tokio::test]
    async fn create_sends_trimmed_body_and_clears_draft() {
        let transport = ScriptedTransport::new();
        transport.push(201, r#"{"_id":"1","name":"Mug","price":9.99}"#);
        transport.push(200, r#"[{"_id":"1","name":"Mug","price":9.99}]"#);
        let mut session = session(&transport);

        session.set_name("  Mug ");
        session.set_price("9.99");
        session.set_description("  ");
        let outcome = session.save().await.unwrap();

        assert_eq!(outcome.message(), "Product added");
        assert!(matches!(outcome, SaveOutcome::Created(Some(_))));
        assert_eq!(transport.methods(), vec![HttpMethod::Post, HttpMethod::Get]);
        let body = sent_body(&transport, 0);
        assert_eq!(body["name"], "Mug");
        assert_eq!(body["price"], 9.99);
        assert_eq!(body["description"], "");
        assert_eq!(body["image"], serde_json::Value::Null);
        assert!(session.draft().is_empty());
        assert_eq!(session.store().len(), 1);
    }

    #[tokio::test]
    async fn empty_price_is_omitted_and_zero_is_sent() {
        let transport = ScriptedTransport::new();
        transport.push(201, "{}");
        transport.push(200, "[]");
        transport.push(201, "{}");
        transport.push(200, "[]");
        let mut session = session(&transport);

        session.set_name("Sticker");
        session.save().await.unwrap();
        assert!(sent_body(&transport, 0).get("price").is_none());

        session.set_name("Freebie");
        session.set_price("0");
        session.save().await.unwrap();
        assert_eq!(sent_body(&transport, 2)["price"], 0.0);
    }

    #[tokio::test]
    async fn failed_create_keeps_draft() {
        let transport = ScriptedTransport::new();
        transport.push(500, "database down");
        let mut session = session(&transport);

        session.set_name("Mug");
        session.set_price("9.99");
        session.set_image("data:image/jpeg;base64,AAAA");
        let before = session.draft().clone();

        let err = session.save().await.unwrap_err();
        assert_eq!(err.to_string(), "Server: 500 database down");
        assert_eq!(session.draft(), &before);
        assert_eq!(transport.methods(), vec![HttpMethod::Post]);
        assert!(!session.store().is_posting());
    }

    #[tokio::test]
    async fn edit_populates_draft_without_network() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);

        session.edit(&mug());
        assert_eq!(session.editing_id(), Some(&ProductId::new("m1")));
        assert_eq!(
            session.draft(),
            &Draft {
                name: "Mug".to_string(),
                price: "9.99".to_string(),
                description: "Blue".to_string(),
                image: Some("https://cdn.example.com/mug.jpg".to_string()),
            }
        );
        assert!(transport.requests().is_empty());

        session.cancel_edit();
        assert!(!session.is_editing());
        assert!(session.draft().is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn edit_renders_whole_prices_without_fraction() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);
        let product: Product =
            serde_json::from_value(serde_json::json!({"_id": "p", "name": "Plate", "price": 12})).unwrap();

        session.edit(&product);
        assert_eq!(session.draft().price, "12");
        assert_eq!(session.draft().description, "");
        assert!(session.draft().image.is_none());
    }

    #[test]
    fn extreme_prices_render_positionally_and_parse_back() {
        for price in [1e21, 1e-7] {
            let product: Product =
                serde_json::from_value(serde_json::json!({"_id": "p", "name": "Odd", "price": price}))
                    .unwrap();
            let draft = Draft::from_product(&product);
            assert!(!draft.price.contains('e'), "{}", draft.price);
            assert_eq!(draft.to_body().unwrap().price, Some(price));
        }
        let product: Product =
            serde_json::from_value(serde_json::json!({"name": "Big", "price": 1e21})).unwrap();
        assert_eq!(Draft::from_product(&product).price, "1000000000000000000000");
    }

    #[tokio::test]
    async fn save_while_editing_updates_and_leaves_edit_mode() {
        let transport = ScriptedTransport::new();
        transport.push(200, r#"{"_id":"m1","name":"Big mug"}"#);
        transport.push(200, r#"[{"_id":"m1","name":"Big mug"}]"#);
        let mut session = session(&transport);

        session.edit(&mug());
        assert_eq!(session.save_label(), "Save");
        session.set_name("Big mug");
        let outcome = session.save().await.unwrap();

        assert_eq!(outcome.message(), "Product updated");
        assert_eq!(transport.methods(), vec![HttpMethod::Put, HttpMethod::Get]);
        assert_eq!(transport.requests()[0].url, "http://api.test/products/m1");
        let body = sent_body(&transport, 0);
        assert_eq!(body["image"], "https://cdn.example.com/mug.jpg");
        assert!(!session.is_editing());
        assert!(session.draft().is_empty());
        assert_eq!(session.save_label(), "Add Product");
    }

    #[tokio::test]
    async fn failed_update_stays_in_edit_mode() {
        let transport = ScriptedTransport::new();
        transport.push(404, "Not Found");
        let mut session = session(&transport);

        session.edit(&mug());
        let err = session.save().await.unwrap_err();
        assert!(matches!(err, SessionError::Api(ApiError::Http { status: 404, .. })));
        assert_eq!(session.editing_id(), Some(&ProductId::new("m1")));
        assert_eq!(session.draft().name, "Mug");
    }

    #[tokio::test]
    async fn delete_intent_without_confirmation_sends_nothing() {
        let transport = ScriptedTransport::new();
        let session = session(&transport);

        let intent = session.request_delete(ProductId::new("m1"));
        assert_eq!(intent.message(), DELETE_PROMPT);
        assert!(transport.requests().is_empty());

        let outcome = intent.resolve(false).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(outcome.message().is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_sends_one_delete_then_one_get() {
        let transport = ScriptedTransport::new();
        transport.push(204, "");
        transport.push(200, "[]");
        let session = session(&transport);

        let confirm = answer(true);
        let outcome = session
            .delete_with(ProductId::new("m1"), &confirm)
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(outcome.message(), Some("Product removed"));
        assert_eq!(confirm.asked.borrow().as_slice(), [DELETE_PROMPT]);
        assert_eq!(transport.methods(), vec![HttpMethod::Delete, HttpMethod::Get]);
        assert_eq!(transport.requests()[0].url, "http://api.test/products/m1");
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let transport = ScriptedTransport::new();
        let session = session(&transport);

        let outcome = session
            .delete_with(ProductId::new("m1"), &answer(false))
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn photo_is_attached_as_data_uri() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);
        let camera = FixedCamera(RefCell::new(Some(Ok(Some(CapturedPhoto::jpeg("AAEC"))))));

        assert!(session.take_photo(&camera).await.unwrap());
        assert_eq!(
            session.draft().image.as_deref(),
            Some("data:image/jpeg;base64,AAEC")
        );
    }

    #[tokio::test]
    async fn cancelled_photo_keeps_current_image() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);
        session.set_image("https://cdn.example.com/old.jpg");
        let camera = FixedCamera(RefCell::new(Some(Ok(None))));

        assert!(!session.take_photo(&camera).await.unwrap());
        assert_eq!(
            session.draft().image.as_deref(),
            Some("https://cdn.example.com/old.jpg")
        );
    }

    #[tokio::test]
    async fn denied_camera_is_a_permission_error() {
        let transport = ScriptedTransport::new();
        let mut session = session(&transport);
        let camera = FixedCamera(RefCell::new(Some(Err(CaptureError::PermissionDenied))));

        let err = session.take_photo(&camera).await.unwrap_err();
        assert_eq!(err, SessionError::Permission(CaptureError::PermissionDenied));
        assert!(session.draft().image.is_none());
        assert!(transport.requests().is_empty());
        assert!(!session.store().is_loading());
    }
}
