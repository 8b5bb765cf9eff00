//! Entity services.
//!
//! Shared plumbing for the uniform list/paginate/get/delete use cases lives
//! here; each entity module adds its filter, DTOs and write rules.

pub mod academy;
pub mod category;
pub mod category_modification;
pub mod field;
pub mod group;
pub mod modification_type;
pub mod order;
pub mod product;
pub mod request_to_group;
pub mod ticket;
pub mod user;

pub use academy::{
    AcademyFilter, AcademyResponse, AcademyService, CreateAcademyInput, UpdateAcademyInput,
};
pub use category::{
    CategoryFilter, CategoryResponse, CategoryService, CreateCategoryInput, UpdateCategoryInput,
};
pub use category_modification::{
    CategoryModificationFilter, CategoryModificationResponse, CategoryModificationService,
    CreateCategoryModificationInput, UpdateCategoryModificationInput,
};
pub use field::{CreateFieldInput, FieldFilter, FieldResponse, FieldService, UpdateFieldInput};
pub use group::{CreateGroupInput, GroupFilter, GroupResponse, GroupService, UpdateGroupInput};
pub use modification_type::{
    CreateModificationTypeInput, ModificationTypeFilter, ModificationTypeResponse,
    ModificationTypeService, UpdateModificationTypeInput,
};
pub use order::{CreateOrderInput, OrderFilter, OrderResponse, OrderService, UpdateOrderInput};
pub use product::{
    CreateProductInput, ProductFilter, ProductResponse, ProductService, UpdateProductInput,
};
pub use request_to_group::{
    CreateRequestToGroupInput, RequestToGroupFilter, RequestToGroupResponse,
    RequestToGroupService, UpdateRequestToGroupInput,
};
pub use ticket::{
    CreateTicketInput, ImageUpload, TicketFilter, TicketResponse, TicketService,
    UpdateTicketInput,
};
pub use user::{CreateUserInput, UpdateUserInput, UserFilter, UserResponse, UserService};

use arena_common::{AppError, AppResult};
use arena_db::{Filter, Hydrated, Page, PaginationFilter, Predicate, Repository, Schema};

/// Every row matching `filter`, with default relations.
async fn list_rows<E, F, T>(repo: &Repository<E>, filter: &F) -> AppResult<Vec<T>>
where
    E: Schema,
    F: Filter + Sync,
    T: From<Hydrated<E>>,
{
    let rows = repo
        .get_with_filters(
            &filter.apply(),
            E::default_load(),
            filter.order_by(),
            filter.order_direction(),
            filter.is_show_deleted(),
        )
        .await?;

    Ok(rows.into_iter().map(T::from).collect())
}

/// One page of rows matching `filter`, with default relations.
async fn paginate_rows<E, F, T>(
    repo: &Repository<E>,
    filter: &PaginationFilter<F>,
) -> AppResult<Page<T>>
where
    E: Schema,
    F: Filter + Sync,
    T: From<Hydrated<E>> + Send,
{
    repo.paginate(
        T::from,
        filter.page,
        &filter.apply(),
        E::default_load(),
        filter.order_by(),
        filter.order_direction(),
        filter.is_show_deleted(),
    )
    .await
}

/// Re-fetch a non-deleted row with default relations.
async fn fetch<E, T>(repo: &Repository<E>, id: i32, not_found: &str) -> AppResult<T>
where
    E: Schema,
    T: From<Hydrated<E>>,
{
    repo.get(id, E::default_load(), false)
        .await?
        .map(T::from)
        .ok_or_else(|| AppError::not_found(not_found))
}

/// A non-deleted row without relations, as the base of an update.
async fn current<E: Schema>(repo: &Repository<E>, id: i32, not_found: &str) -> AppResult<E::Model> {
    repo.get(id, &[], false)
        .await?
        .map(|row| row.model)
        .ok_or_else(|| AppError::not_found(not_found))
}

/// Id of the first non-deleted row matching `filters`.
async fn first_id<E: Schema>(repo: &Repository<E>, filters: &[Predicate]) -> AppResult<Option<i32>> {
    Ok(repo
        .get_first_with_filters(filters, &[])
        .await?
        .map(|row| E::id_of(&row.model)))
}

/// Refuse a hard delete while rows of `C` still point at `id` through `field`.
///
/// Soft-deleted rows count too: the foreign keys reject the delete for them.
async fn check_unreferenced<C: Schema>(
    repo: &Repository<C>,
    field: &'static str,
    id: i32,
    key: &str,
) -> AppResult<()> {
    let filters = [Predicate::Eq {
        field,
        value: id.into(),
    }];
    if repo.exists_with_filters(&filters, true).await? {
        return Err(AppError::bad_request(key));
    }
    Ok(())
}

async fn remove<E: Schema>(
    repo: &Repository<E>,
    id: i32,
    force_delete: bool,
    not_found: &str,
) -> AppResult<()> {
    if repo.delete(id, force_delete).await? {
        Ok(())
    } else {
        Err(AppError::not_found(not_found))
    }
}
