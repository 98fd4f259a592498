use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[derive(Queryable, Selectable, Debug, Clone, serde::Serialize)]
#[diesel(table_name = crate::schema::buildings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Building {
    pub name: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::buildings)]
pub struct NewBuilding<'a> {
    pub name: &'a str,
}

impl Building {
    /// Insert the building unless it already exists.
    ///
    /// Returns the number of rows inserted (0 when the name was taken), so
    /// concurrent callers racing on the same new name both succeed.
    pub async fn ensure(
        building_name: &str,
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::buildings::dsl::*;

        diesel::insert_into(buildings)
            .values(NewBuilding {
                name: building_name,
            })
            .on_conflict(name)
            .do_nothing()
            .execute(conn)
            .await
    }

    pub async fn find(
        building_name: &str,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::buildings::dsl::*;

        buildings
            .find(building_name)
            .select(Building::as_select())
            .first(conn)
            .await
            .optional()
    }
}
