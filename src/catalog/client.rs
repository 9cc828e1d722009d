use super::{
    types::{DeleteResponse, FilamentColor, FilamentType, Product},
    CatalogError,
};
use crate::api::ApiClient;
use tracing::debug;

pub const PRODUCTS_PATH: &str = "/products";
pub const COLORS_PATH: &str = "/colors";
pub const ADD_PRODUCT_PATH: &str = "/add-product";
pub const UPDATE_PRODUCT_PATH: &str = "/update-product";

/// Product and color calls. Shares the session's [`ApiClient`] so the auth
/// cookies ride along.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns [`CatalogError::Api`] if the request fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products: Vec<Product> = self.api.get_json(PRODUCTS_PATH).await?;
        debug!(count = products.len(), "Loaded products");
        Ok(products)
    }

    /// # Errors
    /// Returns [`CatalogError::Api`] if the request fails.
    pub async fn product(&self, id: i64) -> Result<Product, CatalogError> {
        Ok(self.api.get_json(&format!("/product/{id}")).await?)
    }

    /// Colors offered for one filament type.
    ///
    /// # Errors
    /// Returns [`CatalogError::Api`] if the request fails.
    pub async fn colors(&self, filament_type: FilamentType) -> Result<Vec<FilamentColor>, CatalogError> {
        let colors: Vec<FilamentColor> = self
            .api
            .get_json_with_query(COLORS_PATH, &[("filamentType", filament_type.as_str())])
            .await?;
        debug!(%filament_type, count = colors.len(), "Loaded colors");
        Ok(colors)
    }

    /// # Errors
    /// Returns [`CatalogError::Invalid`] before any request if the product fails
    /// form validation, or [`CatalogError::Api`] if the request fails.
    pub async fn create_product(&self, product: &Product) -> Result<Product, CatalogError> {
        product.validate().map_err(CatalogError::Invalid)?;
        Ok(self.api.post_json(ADD_PRODUCT_PATH, product).await?)
    }

    /// # Errors
    /// Returns [`CatalogError::Invalid`] if the product has no id or fails form
    /// validation, or [`CatalogError::Api`] if the request fails.
    pub async fn update_product(&self, product: &Product) -> Result<Product, CatalogError> {
        if product.id.is_none() {
            return Err(CatalogError::Invalid(
                "Product id is required for updates".to_string(),
            ));
        }
        product.validate().map_err(CatalogError::Invalid)?;
        Ok(self.api.put_json(UPDATE_PRODUCT_PATH, product).await?)
    }

    /// # Errors
    /// Returns [`CatalogError::Api`] if the request fails.
    pub async fn delete_product(&self, id: i64) -> Result<DeleteResponse, CatalogError> {
        Ok(self.api.delete_json(&format!("/delete-product/{id}")).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiConfig, ApiError};
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn catalog_for(server: &MockServer) -> Result<CatalogClient> {
        let config = ApiConfig::new(&server.uri())?;
        Ok(CatalogClient::new(ApiClient::new(&config)?))
    }

    fn product_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Test Product",
            "description": "Test Description",
            "image": "test-image.jpg",
            "stl": "test-file.stl",
            "price": 29.99,
            "filamentType": "PLA",
            "color": "red",
            "imageGallery": "[\"image1.jpg\"]"
        })
    }

    #[tokio::test]
    async fn list_products_decodes_gallery_strings() -> Result<()> {
        if !can_bind_localhost() {
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1)])))
            .expect(1)
            .mount(&server)
            .await;

        let products = catalog_for(&server)?.list_products().await?;
        let first = products.first().ok_or_else(|| anyhow!("no products"))?;
        assert_eq!(first.id, Some(1));
        assert_eq!(first.image_gallery, vec!["image1.jpg"]);
        Ok(())
    }

    #[tokio::test]
    async fn colors_sends_filament_type_query() -> Result<()> {
        if !can_bind_localhost() {
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/colors"))
            .and(query_param("filamentType", "PETG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "White PETG",
                "provider": "polymaker",
                "public": true,
                "available": true,
                "color": "PETG",
                "profile": "petg",
                "hexValue": "ffffff",
                "publicId": "white-petg"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let colors = catalog_for(&server)?.colors(FilamentType::Petg).await?;
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].hex_value, "ffffff");
        Ok(())
    }

    #[tokio::test]
    async fn colors_error_carries_error_detail() -> Result<()> {
        if !can_bind_localhost() {
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/colors"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "Colors not found" })),
            )
            .mount(&server)
            .await;

        let err = catalog_for(&server)?
            .colors(FilamentType::Pla)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected an error"))?;
        assert_eq!(
            err,
            CatalogError::Api(ApiError::Http {
                status: 404,
                message: None,
                error: Some("Colors not found".to_string()),
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn create_product_posts_body() -> Result<()> {
        if !can_bind_localhost() {
            return Ok(());
        }
        let server = MockServer::start().await;
        let product = Product {
            name: "Minimal Product".to_string(),
            description: "Basic description".to_string(),
            stl: "minimal.stl".to_string(),
            price: 10.0,
            filament_type: "PLA".to_string(),
            color: "white".to_string(),
            ..Product::default()
        };
        Mock::given(method("POST"))
            .and(path("/add-product"))
            .and(body_json(json!({
                "name": "Minimal Product",
                "description": "Basic description",
                "image": "",
                "stl": "minimal.stl",
                "price": 10.0,
                "filamentType": "PLA",
                "color": "white"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 2,
                "name": "Minimal Product",
                "description": "Basic description",
                "image": "",
                "stl": "minimal.stl",
                "price": 10.0,
                "filamentType": "PLA",
                "color": "white"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = catalog_for(&server)?.create_product(&product).await?;
        assert_eq!(created.id, Some(2));
        assert!(created.image_gallery.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_product_is_rejected_before_sending() -> Result<()> {
        if !can_bind_localhost() {
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let catalog = catalog_for(&server)?;
        let err = catalog
            .create_product(&Product::default())
            .await
            .err()
            .ok_or_else(|| anyhow!("expected an error"))?;
        assert!(matches!(err, CatalogError::Invalid(_)));

        let err = catalog
            .update_product(&Product::default())
            .await
            .err()
            .ok_or_else(|| anyhow!("expected an error"))?;
        assert_eq!(
            err,
            CatalogError::Invalid("Product id is required for updates".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_hit_their_paths() -> Result<()> {
        if !can_bind_localhost() {
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/update-product"))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_json(1)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/delete-product/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Product deleted successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = catalog_for(&server)?;
        let product: Product = serde_json::from_value(product_json(1))?;
        let updated = catalog.update_product(&product).await?;
        assert_eq!(updated.name, "Test Product");

        let deleted = catalog.delete_product(1).await?;
        assert_eq!(deleted.success, Some(true));
        assert_eq!(
            deleted.message.as_deref(),
            Some("Product deleted successfully")
        );
        Ok(())
    }
}
