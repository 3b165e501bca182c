//! # Mock Management Capability
//!
//! [`MockResourceManager`] implements [`ResourceManager`] from a queue of
//! scripted expectations. Each call pops the next expectation; a call that
//! does not match it panics, and [`MockResourceManager::verify`] panics if
//! anything is left over.
//!
//! ```rust
//! use arm_orchestrator::mock::MockResourceManager;
//! use arm_orchestrator::management::ResourceManager;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockResourceManager::new();
//!     mock.expect_resource_group_exists().return_ok(false);
//!     mock.expect_create_resource_group().return_ok(());
//!
//!     assert!(!mock.resource_group_exists("rg1").await.unwrap());
//!     mock.create_resource_group("rg1", "West US").await.unwrap();
//!
//!     mock.verify();
//!     assert_eq!(mock.submitted().len(), 0);
//! }
//! ```
//!
//! Errors are injected the same way:
//!
//! ```rust
//! use arm_orchestrator::error::ManagementApiError;
//! use arm_orchestrator::mock::MockResourceManager;
//! use arm_orchestrator::management::ResourceManager;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockResourceManager::new();
//!     mock.expect_deployment_exists()
//!         .return_err(ManagementApiError::Throttled("slow down".into()));
//!
//!     let result = mock.deployment_exists("rg1", "d1").await;
//!     assert!(matches!(result, Err(ManagementApiError::Throttled(_))));
//! }
//! ```

use crate::error::ManagementApiError;
use crate::management::ResourceManager;
use crate::model::{Deployment, DeploymentDefinition, GenericResource, GenericResourceId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Reply<T> = Result<T, ManagementApiError>;

/// The operations of [`ResourceManager`], used to count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ResourceGroupExists,
    CreateResourceGroup,
    DeleteResourceGroup,
    DeploymentExists,
    GetDeployment,
    SubmitDeployment,
    GenericResourceExists,
    GetGenericResource,
}

#[derive(Debug)]
enum Expectation {
    ResourceGroupExists(Reply<bool>),
    CreateResourceGroup(Reply<()>),
    DeleteResourceGroup(Reply<()>),
    DeploymentExists(Reply<bool>),
    GetDeployment(Reply<Deployment>),
    SubmitDeployment(Reply<()>),
    GenericResourceExists(Reply<bool>),
    GetGenericResource(Reply<GenericResource>),
}

impl Expectation {
    fn operation(&self) -> Operation {
        match self {
            Expectation::ResourceGroupExists(_) => Operation::ResourceGroupExists,
            Expectation::CreateResourceGroup(_) => Operation::CreateResourceGroup,
            Expectation::DeleteResourceGroup(_) => Operation::DeleteResourceGroup,
            Expectation::DeploymentExists(_) => Operation::DeploymentExists,
            Expectation::GetDeployment(_) => Operation::GetDeployment,
            Expectation::SubmitDeployment(_) => Operation::SubmitDeployment,
            Expectation::GenericResourceExists(_) => Operation::GenericResourceExists,
            Expectation::GetGenericResource(_) => Operation::GetGenericResource,
        }
    }
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: HashMap<Operation, usize>,
    submitted: Vec<DeploymentDefinition>,
    created_groups: Vec<(String, String)>,
}

/// A scripted [`ResourceManager`] for tests.
///
/// Clones share the same expectation queue, so one clone can be handed to
/// the orchestrator while the test keeps another for assertions.
#[derive(Clone, Default)]
pub struct MockResourceManager {
    state: Arc<Mutex<MockState>>,
}

impl MockResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_resource_group_exists(&self) -> ExpectationBuilder<bool> {
        self.builder(Expectation::ResourceGroupExists)
    }

    pub fn expect_create_resource_group(&self) -> ExpectationBuilder<()> {
        self.builder(Expectation::CreateResourceGroup)
    }

    pub fn expect_delete_resource_group(&self) -> ExpectationBuilder<()> {
        self.builder(Expectation::DeleteResourceGroup)
    }

    pub fn expect_deployment_exists(&self) -> ExpectationBuilder<bool> {
        self.builder(Expectation::DeploymentExists)
    }

    pub fn expect_get_deployment(&self) -> ExpectationBuilder<Deployment> {
        self.builder(Expectation::GetDeployment)
    }

    pub fn expect_submit_deployment(&self) -> ExpectationBuilder<()> {
        self.builder(Expectation::SubmitDeployment)
    }

    pub fn expect_generic_resource_exists(&self) -> ExpectationBuilder<bool> {
        self.builder(Expectation::GenericResourceExists)
    }

    pub fn expect_get_generic_resource(&self) -> ExpectationBuilder<GenericResource> {
        self.builder(Expectation::GetGenericResource)
    }

    /// Panics unless every expectation has been consumed.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining, next: {:?}",
                state.expectations.len(),
                state.expectations.front().map(Expectation::operation)
            );
        }
    }

    /// How many times `operation` was called.
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Every definition passed to `submit_deployment`, in order.
    pub fn submitted(&self) -> Vec<DeploymentDefinition> {
        self.lock().submitted.clone()
    }

    /// Every `(name, location)` passed to `create_resource_group`, in order.
    pub fn created_groups(&self) -> Vec<(String, String)> {
        self.lock().created_groups.clone()
    }

    fn builder<T>(&self, make: fn(Reply<T>) -> Expectation) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            state: self.state.clone(),
            make,
            times: 1,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(&self, operation: Operation) -> Expectation {
        let mut state = self.lock();
        *state.calls.entry(operation).or_default() += 1;
        match state.expectations.pop_front() {
            Some(expectation) if expectation.operation() == operation => expectation,
            Some(expectation) => panic!(
                "Unexpected request: got {:?}, expected {:?}",
                operation,
                expectation.operation()
            ),
            None => panic!("Unexpected request: got {:?}, no expectations left", operation),
        }
    }
}

/// Fluent builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<T> {
    state: Arc<Mutex<MockState>>,
    make: fn(Reply<T>) -> Expectation,
    times: usize,
}

impl<T> ExpectationBuilder<T> {
    /// Queue the same response `times` times.
    pub fn times(mut self, times: usize) -> Self {
        self.times = times;
        self
    }

    pub fn return_err(self, error: ManagementApiError) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..self.times {
            state.expectations.push_back((self.make)(Err(error.clone())));
        }
    }
}

impl<T: Clone> ExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..self.times {
            state.expectations.push_back((self.make)(Ok(value.clone())));
        }
    }
}

#[async_trait]
impl ResourceManager for MockResourceManager {
    async fn resource_group_exists(&self, _name: &str) -> Reply<bool> {
        match self.next(Operation::ResourceGroupExists) {
            Expectation::ResourceGroupExists(reply) => reply,
            _ => unreachable!(),
        }
    }

    async fn create_resource_group(&self, name: &str, location: &str) -> Reply<()> {
        let reply = match self.next(Operation::CreateResourceGroup) {
            Expectation::CreateResourceGroup(reply) => reply,
            _ => unreachable!(),
        };
        self.lock()
            .created_groups
            .push((name.to_string(), location.to_string()));
        reply
    }

    async fn delete_resource_group(&self, _name: &str) -> Reply<()> {
        match self.next(Operation::DeleteResourceGroup) {
            Expectation::DeleteResourceGroup(reply) => reply,
            _ => unreachable!(),
        }
    }

    async fn deployment_exists(&self, _resource_group: &str, _deployment: &str) -> Reply<bool> {
        match self.next(Operation::DeploymentExists) {
            Expectation::DeploymentExists(reply) => reply,
            _ => unreachable!(),
        }
    }

    async fn get_deployment(&self, _resource_group: &str, _deployment: &str) -> Reply<Deployment> {
        match self.next(Operation::GetDeployment) {
            Expectation::GetDeployment(reply) => reply,
            _ => unreachable!(),
        }
    }

    async fn submit_deployment(&self, definition: DeploymentDefinition) -> Reply<()> {
        let reply = match self.next(Operation::SubmitDeployment) {
            Expectation::SubmitDeployment(reply) => reply,
            _ => unreachable!(),
        };
        self.lock().submitted.push(definition);
        reply
    }

    async fn generic_resource_exists(&self, _id: &GenericResourceId) -> Reply<bool> {
        match self.next(Operation::GenericResourceExists) {
            Expectation::GenericResourceExists(reply) => reply,
            _ => unreachable!(),
        }
    }

    async fn get_generic_resource(&self, _id: &GenericResourceId) -> Reply<GenericResource> {
        match self.next(Operation::GetGenericResource) {
            Expectation::GetGenericResource(reply) => reply,
            _ => unreachable!(),
        }
    }
}
