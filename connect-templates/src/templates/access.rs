//! Scraper access provisioning
//!
//! Only does anything when the cluster denies traffic by default. Then every
//! Connect cluster gets a scraper in the test's namespace and a NetworkPolicy
//! admitting that scraper to the Connect pods.

use connect_common::{TestContext, SCRAPER_KEY};

use crate::config::EnvironmentConfig;
use crate::crd::{naming, KafkaConnect};
use crate::error::{TemplateError, TemplateResult};
use crate::kubernetes::networking::AccessGrant;
use crate::kubernetes::workloads::scraper_deployment;
use crate::pipeline::{ResourceKind, ResourcePipeline};
use crate::templates::namespace::resolve_namespace;

/// Creates scrapers and access grants through a pipeline
pub struct AccessProvisioner<'a> {
    config: &'a EnvironmentConfig,
    pipeline: &'a dyn ResourcePipeline,
}

impl<'a> AccessProvisioner<'a> {
    pub fn new(config: &'a EnvironmentConfig, pipeline: &'a dyn ResourcePipeline) -> Self {
        Self { config, pipeline }
    }

    /// Whether the cluster under test denies traffic by default
    pub fn enabled(&self) -> bool {
        self.config.network.default_to_deny_network_policies
    }

    /// Namespace and name of the scraper serving `resource`
    pub fn scraper_for(
        &self,
        ctx: &TestContext,
        resource: &KafkaConnect,
    ) -> TemplateResult<(String, String)> {
        let namespace = resolve_namespace(
            ctx.store(),
            ctx.parallel_namespace,
            self.config.is_namespace_rbac_scope(),
            resource.require_namespace()?,
        )?;
        let name = match ctx.store().get(SCRAPER_KEY) {
            Some(registered) => registered,
            None => naming::scraper_name(resource.require_name()?),
        };

        Ok((namespace, name))
    }

    /// Ensure a scraper exists and may reach the Connect pods
    pub async fn provision_access(&self, ctx: &TestContext, resource: &KafkaConnect) -> TemplateResult<()> {
        if !self.enabled() {
            tracing::debug!("Default-deny network policies disabled, skipping access provisioning");
            return Ok(());
        }

        let (scraper_namespace, scraper) = self.scraper_for(ctx, resource)?;
        tracing::info!(
            "[{}] Deploying scraper {}/{}",
            ctx.test_name,
            scraper_namespace,
            scraper
        );
        self.pipeline
            .apply(scraper_deployment(&scraper_namespace, &scraper, &self.config.scraper.image).into())
            .await?;

        self.apply_grant(ctx, resource, &scraper_namespace, &scraper).await
    }

    /// Grant an already running scraper access to the Connect pods
    pub async fn allow_access(&self, ctx: &TestContext, resource: &KafkaConnect) -> TemplateResult<()> {
        if !self.enabled() {
            return Ok(());
        }

        let (scraper_namespace, scraper) = self.scraper_for(ctx, resource)?;
        if !self
            .pipeline
            .exists(ResourceKind::Deployment, &scraper_namespace, &scraper)
            .await?
        {
            return Err(TemplateError::ProbeMissing {
                kind: "KafkaConnect".to_string(),
                name: scraper,
                namespace: scraper_namespace,
            });
        }

        self.apply_grant(ctx, resource, &scraper_namespace, &scraper).await
    }

    async fn apply_grant(
        &self,
        ctx: &TestContext,
        resource: &KafkaConnect,
        scraper_namespace: &str,
        scraper: &str,
    ) -> TemplateResult<()> {
        let grant = AccessGrant::for_kafka_connect(resource, scraper_namespace, scraper)?;
        tracing::info!(
            "[{}] Allowing {}/{} to reach {} in namespace {} on ports {:?}",
            ctx.test_name,
            scraper_namespace,
            scraper,
            naming::deployment_name(resource.require_name()?),
            grant.namespace,
            grant.ports
        );

        self.pipeline.apply(grant.to_network_policy().into()).await
    }
}
