/// Key-based accessors shared by every resource client.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, key: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(key).await
                }

                /// Like `get_`, but a missing record is an error.
                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $entity_name_snake>](&self, key: String) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(key.clone())
                        .await?
                        .ok_or_else(|| <$error>::NotFound(key))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, key: String) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    let removed = self.inner.delete(key).await?;
                    tracing::info!(id = %removed.id, "Deleted");
                    Ok(removed)
                }

                /// Ask the actor to stop once its queued requests are handled.
                pub async fn shutdown(&self) -> Result<(), $error> {
                    tracing::debug!("Sending shutdown");
                    self.inner.shutdown().await
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $error, $entity_name_snake);
    };
}
