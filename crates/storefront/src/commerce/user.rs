//! Customer account adapters.

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{error, instrument};

use tillpoint_core::{Address, AddressFormInput, AddressType, AppErr, AppResult, ErrorCode};

use super::errors::handle_mutation_errors;
use super::queries::{AccountAddressCreateMutation, AddressInput, account_address_create};
use super::serializers::serialize_address;
use super::{CommerceClient, CommerceError};
use crate::services::UserService;

/// [`UserService`] backed by the commerce GraphQL API.
#[derive(Clone)]
pub struct CommerceUserService {
    client: CommerceClient,
}

impl CommerceUserService {
    #[must_use]
    pub const fn new(client: CommerceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserService for CommerceUserService {
    #[instrument(skip(self, access_token, input), fields(address_type = address_type.as_str()))]
    async fn account_address_create(
        &self,
        access_token: &SecretString,
        input: &AddressFormInput,
        address_type: AddressType,
    ) -> AppResult<Address> {
        let result = self
            .client
            .execute_as::<AccountAddressCreateMutation>(
                account_address_create::Variables {
                    input: AddressInput::from(&input.to_address()),
                    address_type: address_type.as_str(),
                },
                access_token,
            )
            .await;

        account_address_create_result(address_type, result)
    }
}

fn account_address_create_result(
    address_type: AddressType,
    result: Result<account_address_create::ResponseData, CommerceError>,
) -> AppResult<Address> {
    let address_type = address_type.as_str();

    let data = result.map_err(|e| {
        error!(address_type, error = %e, "Failed to create account address");
        Vec::<AppErr>::from(e)
    })?;

    let Some(payload) = data.account_address_create else {
        error!(address_type, "Account address create mutation returned no data");
        return Err(vec![AppErr::new(ErrorCode::AccountAddressCreate)]);
    };

    if !payload.errors.is_empty() {
        error!(
            address_type,
            errors = ?payload.errors,
            "Account address create mutation returned errors"
        );
        return Err(handle_mutation_errors(payload.errors));
    }

    payload.address.map(serialize_address).ok_or_else(|| {
        error!(address_type, "Account address create mutation returned no address");
        vec![AppErr::new(ErrorCode::AccountAddressCreate)]
    })
}
