use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfiles::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::DisplayName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerOrders::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerOrders::OrderNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerOrders::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessages::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatMessages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(ChatMessages::Body).text().not_null())
                    .col(
                        ColumnDef::new(ChatMessages::MentionedUserIds)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatMessages::MentionedOrderIds)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatMessages::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MessageReactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageReactions::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MessageReactions::MessageId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MessageReactions::UserId).uuid().not_null())
                    .col(ColumnDef::new(MessageReactions::Emoji).string().not_null())
                    .col(
                        ColumnDef::new(MessageReactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_reactions_message")
                            .from(MessageReactions::Table, MessageReactions::MessageId)
                            .to(ChatMessages::Table, ChatMessages::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One reaction per user/emoji/message; toggling deletes the row
        manager
            .create_index(
                Index::create()
                    .name("idx_message_reactions_unique")
                    .table(MessageReactions::Table)
                    .col(MessageReactions::MessageId)
                    .col(MessageReactions::UserId)
                    .col(MessageReactions::Emoji)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatReadState::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatReadState::UserId)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatReadState::LastReadAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatReadState::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatReadState::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MessageReactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomerOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserProfiles {
    Table,
    Id,
    DisplayName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CustomerOrders {
    Table,
    Id,
    OrderNumber,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    Id,
    SenderId,
    Body,
    MentionedUserIds,
    MentionedOrderIds,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MessageReactions {
    Table,
    Id,
    MessageId,
    UserId,
    Emoji,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatReadState {
    Table,
    UserId,
    LastReadAt,
    UpdatedAt,
}
